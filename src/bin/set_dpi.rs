use anyhow::Context;
use set_dpi::{decode, locate, set_resolution, PHYS};
use std::{
    fs,
    path::{Path, PathBuf},
};

const USAGE: &str = "set-dpi usage:
  set-dpi [-v] dpiX dpiY filepattern [filepattern [filepattern...]]";

fn main() -> anyhow::Result<()> {
    let mut args: Vec<_> = std::env::args().skip(1).collect();
    let verbosity = if args.first().map(String::as_str) == Some("-v") {
        args.remove(0);
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    pretty_env_logger::formatted_builder()
        .filter_level(verbosity)
        .init();

    let Some((dpi_x, dpi_y, patterns)) = parse_args(&args) else {
        println!("{USAGE}");
        return Ok(());
    };
    for pattern in patterns {
        let (dir, file_pattern) = split_pattern(pattern);
        let dir = Path::new(dir);
        if !dir.is_dir() {
            log::warn!("Directory {} does not exist. Skipping.", dir.display());
            continue;
        }
        let files = matching_files(dir, file_pattern)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;
        if files.is_empty() {
            log::warn!(
                "No files matching the pattern {file_pattern} in the directory {}. Skipping.",
                dir.display()
            );
            continue;
        }
        for file in files {
            match process_file(&file, dpi_x, dpi_y) {
                Ok((was_x, was_y)) => println!(
                    "{} - DPI (x,y): was ({was_x},{was_y}), now ({dpi_x},{dpi_y})",
                    file.display()
                ),
                Err(e) => log::warn!("Failed to set DPI for image {} ({e:#}).", file.display()),
            }
        }
    }
    Ok(())
}

fn parse_args(args: &[String]) -> Option<(f64, f64, &[String])> {
    match args {
        [dpi_x, dpi_y, patterns @ ..] if !patterns.is_empty() => {
            Some((dpi_x.parse().ok()?, dpi_y.parse().ok()?, patterns))
        }
        _ => None,
    }
}

/// Splits at the last path separator; a bare pattern searches the working directory.
fn split_pattern(arg: &str) -> (&str, &str) {
    match arg.rfind(['/', '\\']) {
        Some(0) => ("/", &arg[1..]),
        Some(i) => (&arg[..i], &arg[i + 1..]),
        None => (".", arg),
    }
}

fn matching_files(dir: &Path, pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|file_name| file_name.to_str())
                    .map(|file_name| wildcard_match(pattern, file_name))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// `*` matches any run of characters, `?` exactly one.
fn wildcard_match(pattern: &str, name: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let name: Vec<char> = name.chars().collect();
    let (mut p, mut n) = (0, 0);
    let mut backtrack = None;
    while n < name.len() {
        match pattern.get(p) {
            Some('*') => {
                backtrack = Some((p, n));
                p += 1;
            }
            Some(&c) if c == '?' || c == name[n] => {
                p += 1;
                n += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    backtrack = Some((star, matched + 1));
                    p = star + 1;
                    n = matched + 1;
                }
                None => return false,
            },
        }
    }
    pattern[p..].iter().all(|&c| c == '*')
}

/// Rewrites the file in place and returns the DPI it had before (zero when unknown).
fn process_file(path: &Path, dpi_x: f64, dpi_y: f64) -> anyhow::Result<(f64, f64)> {
    let input = fs::read(path).context("Failed to read file")?;
    let previous = locate(&input, PHYS, true)
        .and_then(|offset| decode(&input, offset))
        .map(|resolution| resolution.dpi())
        .unwrap_or((0.0, 0.0));
    let output = set_resolution(input, dpi_x, dpi_y)?;
    fs::write(path, output).context("Failed to write file")?;
    log::info!("{} updated", path.display());
    Ok(previous)
}
