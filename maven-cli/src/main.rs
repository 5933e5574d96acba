use std::path::PathBuf;
use std::process;

use log::{error, info};
use maven_core::config::SimConfig;
use maven_sim::Simulator;

struct CliArgs {
    image: Option<PathBuf>,
    config: Option<PathBuf>,
    load_addr: u32,
    entry: u32,
    num_cores: Option<usize>,
    vlmax: Option<usize>,
    pvfb: Option<String>,
    cycle_limit: Option<u64>,
    stats: bool,
    trace: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            image: None,
            config: None,
            load_addr: 0,
            entry: 0,
            num_cores: None,
            vlmax: None,
            pvfb: None,
            cycle_limit: None,
            stats: false,
            trace: false,
        }
    }
}

fn parse_args() -> CliArgs {
    let mut args = CliArgs::default();
    let mut iter = std::env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-f" => {
                if let Some(path) = iter.next() {
                    args.config = Some(PathBuf::from(path));
                }
            }
            "--load-addr" => {
                if let Some(v) = iter.next() {
                    args.load_addr = parse_u32(&v);
                }
            }
            "--entry" | "-e" => {
                if let Some(v) = iter.next() {
                    args.entry = parse_u32(&v);
                }
            }
            "--cores" | "-c" => {
                if let Some(v) = iter.next() {
                    args.num_cores = v.parse().ok();
                }
            }
            "--vlmax" => {
                if let Some(v) = iter.next() {
                    args.vlmax = v.parse().ok();
                }
            }
            "--pvfb" => {
                if let Some(name) = iter.next() {
                    args.pvfb = Some(name);
                }
            }
            "--cycle-limit" => {
                if let Some(v) = iter.next() {
                    args.cycle_limit = v.parse().ok();
                }
            }
            "--stats" => {
                args.stats = true;
            }
            "--trace" => {
                args.trace = true;
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            _ if !arg.starts_with('-') && args.image.is_none() => {
                args.image = Some(PathBuf::from(arg));
            }
            _ => {
                eprintln!("Unknown argument: {}", arg);
                print_usage();
                std::process::exit(1);
            }
        }
    }

    args
}

fn parse_u32(s: &str) -> u32 {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x") {
        u32::from_str_radix(hex, 16).unwrap_or(0)
    } else {
        s.parse().unwrap_or(0)
    }
}

fn print_usage() {
    println!("Maven architecture simulator");
    println!();
    println!("USAGE:");
    println!("    maven-sim [OPTIONS] <IMAGE>");
    println!();
    println!("OPTIONS:");
    println!("    -f, --config <PATH>    TOML configuration file");
    println!("    --load-addr <ADDR>     Image load address [default: 0]");
    println!("    -e, --entry <ADDR>     Entry point [default: 0]");
    println!("    -c, --cores <NUM>      Number of cores");
    println!("    --vlmax <NUM>          Hardware vector length limit");
    println!("    --pvfb <POLICY>        Fragment buffer policy [queue/stack/dual-stack]");
    println!("    --cycle-limit <N>      Stop with an error after N cycles");
    println!("    --stats                Collect and print divergence statistics");
    println!("    --trace                Per-instruction trace logging (RUST_LOG=trace)");
    println!("    -h, --help             Print this help message");
}

fn build_config(args: &CliArgs) -> anyhow::Result<SimConfig> {
    let mut cfg = match &args.config {
        Some(path) => SimConfig::from_toml_file(path)?,
        None => SimConfig::default(),
    };
    if let Some(n) = args.num_cores {
        cfg.num_cores = n;
    }
    if let Some(v) = args.vlmax {
        cfg.vlmax = v;
    }
    if let Some(name) = &args.pvfb {
        cfg.pvfb_policy = match name.as_str() {
            "queue" => maven_core::config::PvfbPolicy::Queue,
            "stack" => maven_core::config::PvfbPolicy::Stack,
            "dual-stack" => maven_core::config::PvfbPolicy::DualStack,
            other => anyhow::bail!("unknown pvfb policy: {}", other),
        };
    }
    cfg.stats |= args.stats;
    cfg.trace |= args.trace;
    cfg.validate()?;
    Ok(cfg)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info")).init();
    let args = parse_args();

    let image_path = match &args.image {
        Some(p) => p.clone(),
        None => {
            eprintln!("No image specified");
            print_usage();
            process::exit(1);
        }
    };

    let cfg = match build_config(&args) {
        Ok(c) => c,
        Err(e) => {
            error!("Bad configuration: {}", e);
            process::exit(1);
        }
    };

    let image = match std::fs::read(&image_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read {}: {}", image_path.display(), e);
            process::exit(1);
        }
    };

    info!("Maven simulator: {} core(s), vlmax {}", cfg.num_cores, cfg.vlmax);
    info!(
        "Loading {} ({} bytes) at {:#010x}",
        image_path.display(),
        image.len(),
        args.load_addr
    );

    let print_stats = cfg.stats;
    let mut sim = Simulator::new(cfg);
    if let Some(limit) = args.cycle_limit {
        sim.set_cycle_limit(limit);
    }
    if let Err(e) = sim.load_image(args.load_addr, &image) {
        error!("Failed to load image: {}", e);
        process::exit(1);
    }

    let exit = match sim.run(args.entry) {
        Ok(v) => v,
        Err(e) => {
            error!("Runtime error: {}", e);
            process::exit(1);
        }
    };

    info!("Guest exited with {} after {} cycles", exit, sim.cycle());
    if print_stats {
        match serde_json::to_string_pretty(&sim.stats_report()) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize statistics: {}", e),
        }
    }

    process::exit(exit as i32);
}
