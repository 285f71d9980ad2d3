//! clap command tree
//!
//! The filter flags are not fixed: every key declared in the `inputs` config
//! becomes a typed `--<key> <VALUE>` option on the commands that take a
//! constraint. clap's `string` feature lets the flag names come from the
//! runtime config.

use std::collections::BTreeMap;

use clap::{Arg, ArgAction, Command};

use rundex_core::ScalarKind;

/// Build the full command tree from the configured input keys.
pub fn build_cli(input_keys: &BTreeMap<String, ScalarKind>) -> Command {
    Command::new("rundex")
        .about("Index, query, and compare simulation run metadata")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .value_name("PREFIX")
                .default_value("output")
                .global(true)
                .help("Output prefix: runs live in <PREFIX>/, the index in <PREFIX>.db"),
        )
        .subcommand(
            Command::new("update")
                .visible_alias("u")
                .about("Reconcile the index with the output directory")
                .arg(
                    Arg::new("prune")
                        .long("prune")
                        .action(ArgAction::SetTrue)
                        .help("Drop records whose info file no longer exists"),
                )
                .arg(
                    Arg::new("fast")
                        .long("fast")
                        .action(ArgAction::SetTrue)
                        .help("Skip files whose mtime matches the stored one"),
                ),
        )
        .subcommand(with_filter_flags(
            Command::new("print")
                .visible_alias("p")
                .about("Print the entries matching the given filters")
                .arg(print_style_arg())
                .arg(show_field_arg())
                .arg(no_update_arg()),
            input_keys,
        ))
        .subcommand(
            Command::new("print-entry")
                .visible_alias("pe")
                .about("Print one entry by filename")
                .arg(
                    Arg::new("filename")
                        .value_name("FILENAME")
                        .required(true)
                        .help("The run identifier"),
                )
                .arg(print_style_arg())
                .arg(show_field_arg()),
        )
        .subcommand(
            Command::new("print-diff")
                .visible_alias("pd")
                .visible_alias("diff")
                .about("Print the differing inputs of two entries")
                .arg(
                    Arg::new("filename1")
                        .value_name("FILENAME1")
                        .required(true),
                )
                .arg(
                    Arg::new("filename2")
                        .value_name("FILENAME2")
                        .required(true),
                )
                .arg(
                    Arg::new("style")
                        .long("style")
                        .value_name("STYLE")
                        .default_value("horizontal")
                        .help("One of: horizontal, vertical"),
                ),
        )
        .subcommand(with_filter_flags(
            Command::new("number")
                .visible_alias("n")
                .about("Count entries, total or matching the given filters")
                .arg(no_update_arg()),
            input_keys,
        ))
        .subcommand(with_filter_flags(
            Command::new("search")
                .visible_alias("s")
                .about("Run a named search preset, with filter flags as overrides")
                .arg(
                    Arg::new("search-config")
                        .long("search-config")
                        .value_name("PRESET")
                        .help("Preset name from the search_config file; omit to search by flags alone"),
                )
                .arg(no_update_arg()),
            input_keys,
        ))
        .subcommand(
            Command::new("delete")
                .visible_alias("d")
                .about("Delete a run's output files and its index record")
                .arg(
                    Arg::new("filename")
                        .value_name("FILENAME")
                        .required(true)
                        .help("The run identifier"),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
}

fn with_filter_flags(mut cmd: Command, input_keys: &BTreeMap<String, ScalarKind>) -> Command {
    for (key, kind) in input_keys {
        cmd = cmd.arg(
            Arg::new(key.clone())
                .long(key.clone())
                .value_name(kind.name().to_uppercase())
                .help(format!("Filter: {} = <{}>", key, kind.name())),
        );
    }
    cmd
}

fn print_style_arg() -> Arg {
    Arg::new("print-style")
        .long("print-style")
        .value_name("STYLE")
        .default_value("full")
        .help("One of: names, brief, full, diff")
}

fn show_field_arg() -> Arg {
    Arg::new("show-field")
        .long("show-field")
        .value_name("PATH")
        .action(ArgAction::Append)
        .help("Also print this extra field (dotted path); repeatable")
}

fn no_update_arg() -> Arg {
    Arg::new("no-update")
        .long("no-update")
        .action(ArgAction::SetTrue)
        .help("Query the index as-is, without reconciling first")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> BTreeMap<String, ScalarKind> {
        [
            ("omega".to_string(), ScalarKind::Float),
            ("nsteps".to_string(), ScalarKind::Int),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn filter_flags_exist_per_configured_key() {
        let matches = build_cli(&keys())
            .try_get_matches_from(["rundex", "print", "--omega", "0.057", "--nsteps", "4000"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("omega").unwrap(), "0.057");
        assert_eq!(sub.get_one::<String>("nsteps").unwrap(), "4000");
    }

    #[test]
    fn aliases_resolve_to_their_commands() {
        for (alias, command) in [
            ("u", "update"),
            ("p", "print"),
            ("pe", "print-entry"),
            ("pd", "print-diff"),
            ("diff", "print-diff"),
            ("n", "number"),
            ("s", "search"),
            ("d", "delete"),
        ] {
            let mut argv = vec!["rundex", alias];
            if command == "print-entry" || command == "delete" {
                argv.push("run1");
            }
            if command == "print-diff" {
                argv.extend(["run1", "run2"]);
            }
            let matches = build_cli(&keys()).try_get_matches_from(argv).unwrap();
            assert_eq!(matches.subcommand().unwrap().0, command);
        }
    }

    #[test]
    fn prefix_is_global_with_default() {
        let matches = build_cli(&keys())
            .try_get_matches_from(["rundex", "update"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("prefix").unwrap(), "output");

        let matches = build_cli(&keys())
            .try_get_matches_from(["rundex", "update", "--prefix", "scratch"])
            .unwrap();
        assert_eq!(matches.get_one::<String>("prefix").unwrap(), "scratch");
    }

    #[test]
    fn search_works_without_a_preset() {
        let matches = build_cli(&keys())
            .try_get_matches_from(["rundex", "search", "--omega", "0.057"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert!(sub.get_one::<String>("search-config").is_none());
        assert_eq!(sub.get_one::<String>("omega").unwrap(), "0.057");
    }

    #[test]
    fn print_entry_takes_a_print_style() {
        let matches = build_cli(&keys())
            .try_get_matches_from(["rundex", "print-entry", "run1", "--print-style", "brief"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("print-style").unwrap(), "brief");
    }

    #[test]
    fn unknown_filter_flag_is_rejected() {
        assert!(build_cli(&keys())
            .try_get_matches_from(["rundex", "print", "--ghost", "1"])
            .is_err());
    }
}
