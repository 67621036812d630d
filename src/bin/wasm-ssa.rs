//! The CLI boundary: parse a handful of flags, translate one module,
//! and either write out its dumped IR or report the failure.
//!
//! Argument parsing is hand-rolled rather than pulled in from a crate:
//! four flags don't warrant one, matching how the system this binary
//! is modelled on (`host/main.c`) hand-rolls its own `getopt_long`
//! loop rather than reaching for a framework.

use std::fs;
use std::io::Write;
use std::process;

use log::error;
use wasm_ssa::ir::DumpControl;
use wasm_ssa::{Config, Engine, Module, Store};

struct Args {
    module_path: String,
    optimize: bool,
    log_level: u8,
    ir_dump: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut module_path = None;
    let mut optimize = false;
    let mut log_level = 2u8;
    let mut ir_dump = None;

    let mut raw = std::env::args().skip(1);
    while let Some(arg) = raw.next() {
        match arg.as_str() {
            "--module" => {
                module_path = Some(raw.next().ok_or("--module requires a path")?);
            }
            "--optimize" => {
                optimize = true;
            }
            "--log-level" => {
                let value = raw.next().ok_or("--log-level requires a number")?;
                log_level = value.parse().map_err(|_| "--log-level must be 0-5")?;
                if log_level > 5 {
                    return Err("--log-level must be 0-5".to_string());
                }
            }
            "--ir-dump" => {
                ir_dump = Some(raw.next().ok_or("--ir-dump requires a path, or -")?);
            }
            other => return Err(format!("unrecognised argument: {}", other)),
        }
    }

    Ok(Args {
        module_path: module_path.ok_or("--module <path> is required")?,
        optimize,
        log_level,
        ir_dump,
    })
}

fn level_filter(level: u8) -> log::LevelFilter {
    match level {
        0 => log::LevelFilter::Off,
        1 => log::LevelFilter::Error,
        2 => log::LevelFilter::Warn,
        3 => log::LevelFilter::Info,
        4 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn run(args: Args) -> Result<(), wasm_ssa::WasmError> {
    let bytes = fs::read(&args.module_path)
        .map_err(|e| wasm_ssa::WasmError::invalid(format!("cannot read module file: {}", e), 0))?;

    let engine = Engine::with_config(Config::new().optimize(args.optimize));
    let store = Store::new(&engine);
    let module = Module::new(&store, &bytes)?;

    if let Some(dest) = args.ir_dump {
        let mut text = Vec::new();
        module.dump(&mut |chunk: &[u8]| {
            text.extend_from_slice(chunk);
            DumpControl::Continue
        });
        if dest == "-" {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            let _ = handle.write_all(&text);
        } else {
            fs::write(&dest, &text)
                .map_err(|e| wasm_ssa::WasmError::invalid(format!("cannot write ir dump: {}", e), 0))?;
        }
    }

    Ok(())
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("wasm-ssa: {}", message);
            process::exit(1);
        }
    };

    env_logger::Builder::new().filter_level(level_filter(args.log_level)).init();

    if let Err(e) = run(args) {
        error!("{}", e);
        process::exit(1);
    }
}
