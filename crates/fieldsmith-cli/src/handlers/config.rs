//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigFormat, ConfigInitArgs, ConfigShowArgs};
use crate::config::{Config, CONFIG_FILE_STEM};
use crate::error::Result;
use crate::output::OutputWriter;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Serialize)]
struct SearchPath {
    path: PathBuf,
    exists: bool,
    loaded: bool,
}

/// Handle the config command
pub fn handle_config(
    args: ConfigArgs,
    config: &Config,
    loaded_from: Option<&Path>,
    output: &mut OutputWriter,
) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
        ConfigAction::Path => handle_config_path(loaded_from, output),
    }
}

fn init_target(args: &ConfigInitArgs) -> Result<PathBuf> {
    if args.user {
        Config::user_config_path()
    } else {
        Ok(PathBuf::from(format!("{}.toml", CONFIG_FILE_STEM)))
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = init_target(&args)?;

    if path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ))?;
        return Ok(());
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    output.info("Edit it to customize schema naming, depth limits and output.")
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = match args.format {
        ConfigFormat::Toml => config.to_toml()?,
        ConfigFormat::Json => config.to_json()?,
        ConfigFormat::Yaml => config.to_yaml()?,
    };

    if content.ends_with('\n') {
        output.write(&content)
    } else {
        output.writeln(&content)
    }
}

/// Handle config path subcommand
fn handle_config_path(loaded_from: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    let mut paths: Vec<SearchPath> = Config::default_config_paths()
        .into_iter()
        .map(|path| SearchPath {
            exists: path.exists(),
            loaded: loaded_from == Some(path.as_path()),
            path,
        })
        .collect();

    // an explicit --config path is not on the search list
    if let Some(loaded) = loaded_from {
        if !paths.iter().any(|p| p.loaded) {
            paths.insert(
                0,
                SearchPath {
                    path: loaded.to_path_buf(),
                    exists: true,
                    loaded: true,
                },
            );
        }
    }

    if !output.is_human() {
        return output.data(&paths);
    }

    for entry in &paths {
        let marker = if entry.loaded {
            "→"
        } else if entry.exists {
            "•"
        } else {
            " "
        };
        output.writeln(&format!("{} {}", marker, entry.path.display()))?;
    }
    if loaded_from.is_none() {
        output.info("No configuration file found; using defaults")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_show_toml_parses_back() {
        let captured = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, false, 0, Box::new(captured.clone()));
        let mut config = Config::default();
        config.compile.max_depth = 12;

        handle_config_show(
            ConfigShowArgs {
                format: ConfigFormat::Toml,
            },
            &config,
            &mut output,
        )
        .unwrap();

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_explicit_config_is_listed_first() {
        let captured = Captured::default();
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, 0, Box::new(captured.clone()));

        handle_config_path(Some(Path::new("/tmp/custom-fieldsmith.toml")), &mut output).unwrap();

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(parsed[0]["path"], "/tmp/custom-fieldsmith.toml");
        assert_eq!(parsed[0]["loaded"], true);
    }

    #[test]
    fn test_init_target() {
        let project = init_target(&ConfigInitArgs {
            user: false,
            force: false,
        })
        .unwrap();
        assert_eq!(project, PathBuf::from(".fieldsmith.toml"));
    }
}
