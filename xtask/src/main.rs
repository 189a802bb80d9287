//! Workspace chores: `cargo xtask precommit [--full]` and
//! `cargo xtask install-hooks`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

/// One cargo invocation of the precommit gate.
struct Check {
    name: &'static str,
    cargo_args: &'static [&'static str],
    /// Only run with `--full`.
    full_only: bool,
}

const CHECKS: &[Check] = &[
    Check {
        name: "format",
        cargo_args: &["fmt", "--all", "--", "--check"],
        full_only: false,
    },
    Check {
        name: "lint (sqlite)",
        cargo_args: &[
            "clippy", "-p", "geocolumn-core", "-p", "geocolumn-diesel", "--features", "sqlite",
            "--all-targets", "--", "-D", "warnings",
        ],
        full_only: false,
    },
    Check {
        name: "core tests",
        cargo_args: &["test", "--workspace"],
        full_only: false,
    },
    Check {
        name: "diesel sqlite tests",
        cargo_args: &["test", "-p", "geocolumn-diesel", "--features", "sqlite"],
        full_only: false,
    },
    Check {
        name: "lint (postgres)",
        cargo_args: &[
            "clippy", "-p", "geocolumn-diesel", "--features", "postgres", "--", "-D", "warnings",
        ],
        full_only: true,
    },
    Check {
        name: "docs",
        cargo_args: &["doc", "--workspace", "--no-deps"],
        full_only: true,
    },
];

#[derive(Debug, PartialEq, Eq)]
enum Task {
    Precommit { full: bool },
    InstallHooks,
    Help,
}

fn main() -> ExitCode {
    let outcome = parse_task(env::args().skip(1)).and_then(|task| match task {
        Task::Precommit { full } => precommit(full),
        Task::InstallHooks => install_hooks(),
        Task::Help => {
            eprintln!("{USAGE}");
            Ok(())
        }
    });
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("xtask: {message}");
            ExitCode::FAILURE
        }
    }
}

const USAGE: &str = "usage: cargo xtask <precommit [--full] [--ci] | install-hooks | help>";

fn parse_task(mut args: impl Iterator<Item = String>) -> Result<Task, String> {
    let task = match args.next().as_deref() {
        Some("precommit") => Task::Precommit { full: false },
        Some("install-hooks") => Task::InstallHooks,
        Some("help" | "--help" | "-h") => Task::Help,
        Some(other) => return Err(format!("unknown command `{other}`\n{USAGE}")),
        None => return Err(format!("no command given\n{USAGE}")),
    };
    args.try_fold(task, |task, flag| match (task, flag.as_str()) {
        (Task::Precommit { .. }, "--full") => Ok(Task::Precommit { full: true }),
        // accepted for CI scripts; the gate is identical
        (task @ Task::Precommit { .. }, "--ci") => Ok(task),
        (_, flag) => Err(format!("unexpected argument `{flag}`")),
    })
}

fn workspace_root() -> Result<PathBuf, String> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| "xtask is not inside a workspace".to_string())
}

fn precommit(full: bool) -> Result<(), String> {
    let root = workspace_root()?;
    let selected = CHECKS.iter().filter(|check| full || !check.full_only);
    for check in selected {
        eprintln!("==> {} (cargo {})", check.name, check.cargo_args.join(" "));
        let status = Command::new("cargo")
            .args(check.cargo_args)
            .current_dir(&root)
            .status()
            .map_err(|e| format!("{}: could not start cargo: {e}", check.name))?;
        if !status.success() {
            return Err(format!("{} failed ({status})", check.name));
        }
    }
    Ok(())
}

fn install_hooks() -> Result<(), String> {
    let root = workspace_root()?;
    let hooks = root.join(".git").join("hooks");
    let hook = hooks.join("pre-commit");
    let script = format!(
        "#!/usr/bin/env sh\nset -eu\ncd \"{}\"\nexec cargo run --quiet -p xtask -- precommit\n",
        root.display()
    );

    fs::create_dir_all(&hooks).map_err(|e| format!("{}: {e}", hooks.display()))?;
    fs::write(&hook, script).map_err(|e| format!("{}: {e}", hook.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755))
            .map_err(|e| format!("{}: {e}", hook.display()))?;
    }

    println!("pre-commit hook written to {}", hook.display());
    Ok(())
}
