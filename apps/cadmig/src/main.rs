//! Cadmig CLI binary entry point.
//! Delegates to library modules for check/fix/migrate and prints results.

use cadmig::cli::{Cli, Commands};
use cadmig::config::{self, Effective, Overrides};
use cadmig::engine::Engine;
use cadmig::logging::{self, TracingLogger};
use cadmig::utils::{error_prefix, note_prefix};
use cadmig::{fix, lint, output, templates};
use clap::Parser;

fn flag(on: bool) -> Option<bool> {
    if on {
        Some(true)
    } else {
        None
    }
}

fn paths(p: Vec<String>) -> Option<Vec<String>> {
    if p.is_empty() {
        None
    } else {
        Some(p)
    }
}

fn resolve(overrides: Overrides<'_>) -> (Effective, Engine) {
    let eff = config::resolve_effective(&overrides);
    match config::load_config(&eff.repo_root) {
        Ok(Some(_)) => {}
        Ok(None) => eprintln!("{} No cadmig.toml found; using defaults.", note_prefix()),
        Err(e) => eprintln!("{} {}; using defaults.", error_prefix(), e),
    }
    let engine = Engine::configured(&eff.disabled_rules, &eff.markers);
    for id in &eff.disabled_rules {
        if cadmig::catalog::BUILTIN.get(id).is_none() {
            eprintln!("{} unknown rule in [rules].disable: {}", note_prefix(), id);
        }
    }
    (eff, engine)
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Rules { repo_root, output } => {
            let (eff, engine) = resolve(Overrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                ..Default::default()
            });
            output::print_rules(engine.catalog().rules(), &eff.output);
        }
        Commands::Check {
            repo_root,
            output,
            allow_legacy,
            paths: p,
        } => {
            let (eff, engine) = resolve(Overrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                allow_legacy_syntax: flag(allow_legacy),
                paths: paths(p),
                ..Default::default()
            });
            let (result, errors) = lint::run_check(&eff, &engine);
            output::print_check(&result, &eff.output, &errors);
            if result.summary.invalid > 0 || !errors.is_empty() {
                std::process::exit(1);
            }
        }
        Commands::Fix {
            repo_root,
            write,
            diff,
            check,
            output,
            paths: p,
        } => {
            let (eff, engine) = resolve(Overrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                write: flag(write),
                diff: flag(diff),
                check: flag(check),
                paths: paths(p),
                ..Default::default()
            });
            // diff and check are previews
            let eff_write = if eff.diff || eff.check { false } else { eff.write };
            let (results, errors) = fix::run_fix(&eff, &engine, eff_write, eff.diff);
            output::print_fix(&results, &eff.output, eff_write, eff.diff, &errors);
            if !errors.is_empty() || (eff.check && results.iter().any(|r| r.changed)) {
                std::process::exit(1);
            }
        }
        Commands::Migrate {
            repo_root,
            write,
            output,
            paths: p,
        } => {
            let (eff, engine) = resolve(Overrides {
                repo_root: repo_root.as_deref(),
                output: output.as_deref(),
                paths: paths(p),
                ..Default::default()
            });
            let (outcomes, errors) = templates::run_migrate(
                &eff.repo_root,
                &eff.templates,
                &engine,
                &TracingLogger,
                eff.max_passes,
                write,
            );
            output::print_migrate(&outcomes, &eff.output, write, &errors);
            if outcomes.is_empty() && errors.is_empty() && eff.output != "json" {
                eprintln!("{} no template records matched {:?}", error_prefix(), eff.templates);
            }
            if !errors.is_empty() || outcomes.iter().any(|o| o.failed()) {
                std::process::exit(1);
            }
        }
    }
}
