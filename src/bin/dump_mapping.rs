use clap::ValueEnum;
use std::{env, process::exit};
use tabjoin::mapping::{mapping_to_yaml, Preset};

fn main() {
    // Optional single argument: preset name, defaults to basic.
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [basic|extended]", args[0]);
        exit(1);
    }

    let preset = match args.get(1) {
        Some(name) => match Preset::from_str(name, true) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit(1);
            }
        },
        None => Preset::Basic,
    };

    match mapping_to_yaml(&preset.mapping()) {
        Ok(yaml) => print!("# {} preset\n{}", preset, yaml),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}
