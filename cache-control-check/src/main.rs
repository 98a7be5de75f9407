// Copyright 2024 Wladimir Palant
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![doc = include_str!("../README.md")]

use cache_control_module::configuration::CacheControlConf;
use cache_control_module::CacheControlHandler;
use clap::Parser;
use log::error;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Show the headers added to responses for the given request paths
#[derive(Debug, Parser)]
#[command(version, about)]
struct Opt {
    /// The path to the configuration file. This command line flag can be specified multiple times.
    #[arg(short, long)]
    conf: Vec<PathBuf>,

    /// Request paths to check
    #[arg(required = true)]
    paths: Vec<String>,
}

/// Writes the headers applying to each of the paths.
fn report(
    handler: &CacheControlHandler,
    paths: &[String],
    out: &mut impl Write,
) -> std::io::Result<()> {
    for path in paths {
        match handler.headers_for(path) {
            Some(headers) if !headers.is_empty() => {
                writeln!(out, "{path}")?;
                for (name, value) in headers.iter() {
                    writeln!(out, "    {name}: {}", String::from_utf8_lossy(value.as_bytes()))?;
                }
            }
            _ => writeln!(out, "{path}: no headers")?,
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let opt = Opt::parse();

    let handler =
        match CacheControlConf::load_from_files(&opt.conf).and_then(CacheControlHandler::new) {
            Ok(handler) => handler,
            Err(err) => {
                error!("{err}");
                return ExitCode::FAILURE;
            }
        };

    if let Err(err) = report(&handler, &opt.paths, &mut std::io::stdout().lock()) {
        error!("Failed writing output: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
