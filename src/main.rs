//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, ArgMatches, SubCommand};
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use std::env;
use std::io::Write;
use std::process;
use tessel_core::pyramid::Pyramid;
use tessel_service::{Protocol, TileService};
use tile_matrix::CrsBook;

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        writeln!(
            buf,
            "{}.{:03} {} {}",
            time::strftime("%Y-%m-%d %H:%M:%S", &t).unwrap_or_default(),
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log_env = env::var("RUST_LOG").ok();
    let rust_log = match (args.value_of("loglevel"), rust_log_env.as_ref()) {
        (None, Some(rust_log)) => rust_log.as_str(),
        (loglevel, _) => loglevel.unwrap_or("info"),
    };
    builder.parse_filters(rust_log);

    builder.init();
}

fn service_from_args(args: &ArgMatches<'_>) -> Result<TileService, String> {
    let config = args
        .value_of("config")
        .ok_or_else(|| "Missing configuration file".to_string())?;
    info!("Reading configuration from '{}'", config);
    TileService::from_config_file(config, CrsBook::default()).map_err(|e| e.to_string())
}

fn check(args: &ArgMatches<'_>) -> Result<(), String> {
    let service = service_from_args(args)?;
    let catalog = service.catalog();
    println!("Tile matrix sets: {}", catalog.tms_book().ids().join(", "));
    for layer in catalog.layers() {
        let pyramid = layer.pyramid();
        println!(
            "Layer '{}': {} levels {}..{} in {} ({})",
            layer.id(),
            pyramid.levels().len(),
            pyramid.highest_level().id(),
            pyramid.lowest_level().id(),
            pyramid.tms().id(),
            pyramid.format()
        );
        for extra in layer.extra_tile_matrix_sets() {
            println!("  + {}", extra.identifier());
        }
        for diagnostic in layer.diagnostics() {
            println!("  - {}", diagnostic);
        }
    }
    for excluded in catalog.excluded() {
        println!("Layer '{}' excluded: {}", excluded.id, excluded.error);
    }
    if catalog.excluded().is_empty() {
        Ok(())
    } else {
        Err(format!("{} layers excluded", catalog.excluded().len()))
    }
}

fn limits(args: &ArgMatches<'_>) -> Result<(), String> {
    let service = service_from_args(args)?;
    let layer = args.value_of("layer").unwrap_or_default();
    let capabilities = service.capabilities(layer).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(&capabilities).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}

fn gettile(args: &ArgMatches<'_>) -> Result<(), String> {
    let service = service_from_args(args)?;
    let protocol = match args.value_of("protocol").unwrap_or("WMTS") {
        p if p.eq_ignore_ascii_case("WMTS") => Protocol::Wmts,
        p if p.eq_ignore_ascii_case("TMS") => Protocol::Tms,
        p => return Err(format!("Unknown protocol '{}'", p)),
    };
    let index = |name: &str| {
        args.value_of(name)
            .unwrap_or_default()
            .parse::<u32>()
            .map_err(|_| format!("Error parsing '{}' as integer value", name))
    };
    let (col, row) = (index("col")?, index("row")?);
    match service.validate_tile(
        protocol,
        args.value_of("layer").unwrap_or_default(),
        args.value_of("tms").unwrap_or_default(),
        args.value_of("tilematrix").unwrap_or_default(),
        col,
        row,
    ) {
        Ok(target) => {
            match target.storage {
                Some(storage) => println!("{}", storage),
                None => println!("{} {} ({}, {})", target.tms, target.tile_matrix, col, row),
            }
            Ok(())
        }
        Err(e) => {
            println!("not found");
            Err(e.to_string())
        }
    }
}

fn genconfig(args: &ArgMatches<'_>) {
    if args.is_present("pyramid") {
        println!("{}", Pyramid::gen_config());
    } else {
        println!("{}", TileService::gen_config());
    }
}

fn main() {
    dotenv().ok();
    let mut app = App::new("tessel")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("Publish tile pyramids as WMTS and TMS layers")
        .subcommand(SubCommand::with_name("check")
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Load the configuration and report layers and tile matrix sets"))
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("--pyramid 'Generate a pyramid descriptor template'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"))
        .subcommand(SubCommand::with_name("limits")
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --layer=<ID> 'Layer identifier'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Print tile limits of a layer"))
        .subcommand(SubCommand::with_name("gettile")
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --layer=<ID> 'Layer identifier'
                                              --tms=<ID> 'Tile matrix set identifier'
                                              --tilematrix=<ID> 'Tile matrix identifier'
                                              --col=<N> 'Tile column'
                                              --row=<N> 'Tile row'
                                              --protocol=[WMTS|TMS] 'Tile protocol (Default: WMTS)'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Validate a tile address"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => {
            let result = match matches.subcommand() {
                ("check", Some(sub_m)) => {
                    init_logger(sub_m);
                    check(sub_m)
                }
                ("genconfig", Some(sub_m)) => {
                    init_logger(sub_m);
                    genconfig(sub_m);
                    Ok(())
                }
                ("limits", Some(sub_m)) => {
                    init_logger(sub_m);
                    limits(sub_m)
                }
                ("gettile", Some(sub_m)) => {
                    init_logger(sub_m);
                    gettile(sub_m)
                }
                _ => {
                    let _ = app.print_help();
                    println!("");
                    Ok(())
                }
            };
            if let Err(e) = result {
                error!("{}", e);
                process::exit(1);
            }
        }
    }
}
