use recli::{record, union, ArgumentParser, ParseError, Record, RecordUnion};

record! {
    /// Network shape.
    pub struct Net {
        /// Hidden layer width.
        pub hidden_dim: i64 = 32,
        /// Number of layers.
        pub depth: i64 = 2,
    }
}

record! {
    /// Full experiment configuration.
    pub struct Config {
        /// Experiment name.
        pub name: String,
        /// Network shape.
        pub net: Net = Net { hidden_dim: 32, depth: 2 },
    }
}

#[test]
fn nested_fields_get_dotted_kebab_flags() {
    let ns = ArgumentParser::with_prog("exp")
        .add_arguments::<Config>("cfg")
        .parse_args(["--name", "run1", "--net.hidden-dim", "128"])
        .unwrap();
    assert_eq!(
        ns.get::<Config>("cfg"),
        Some(&Config {
            name: "run1".to_string(),
            net: Net {
                hidden_dim: 128,
                depth: 2,
            },
        })
    );
}

#[test]
fn nested_records_without_field_defaults_stay_usable() {
    record! {
        pub struct Outer {
            /// Inner part.
            pub net: Net,
        }
    }

    let ns = ArgumentParser::with_prog("exp")
        .add_arguments::<Outer>("o")
        .parse_args(["--net.depth", "5"])
        .unwrap();
    assert_eq!(
        ns.get::<Outer>("o").unwrap().net,
        Net {
            hidden_dim: 32,
            depth: 5,
        }
    );
}

#[test]
fn optional_subgroups_default_to_absent() {
    record! {
        /// Cache settings.
        pub struct Cache {
            /// Cache directory.
            pub dir: String = "/tmp/cache".to_string(),
            /// Maximum entries.
            pub entries: i64 = 100,
        }
    }
    record! {
        pub struct App {
            /// Application name.
            pub name: String,
            /// Optional cache settings.
            pub cache: Option<Cache> = None,
        }
    }

    let ns = ArgumentParser::with_prog("app")
        .add_arguments::<App>("app")
        .parse_args(["--name", "x"])
        .unwrap();
    assert_eq!(ns.get::<App>("app").unwrap().cache, None);

    let ns = ArgumentParser::with_prog("app")
        .add_arguments::<App>("app")
        .parse_args(["--name", "x", "--cache.entries", "5"])
        .unwrap();
    assert_eq!(
        ns.get::<App>("app").unwrap().cache,
        Some(Cache {
            dir: "/tmp/cache".to_string(),
            entries: 5,
        })
    );
}

record! {
    /// Fully connected model.
    pub struct Mlp {
        /// Hidden layer width.
        pub hidden_dim: i64 = 64,
    }
}

record! {
    /// Convolutional model.
    pub struct Conv {
        /// Kernel size.
        pub kernel: i64 = 3,
        /// Stride.
        pub stride: i64 = 1,
    }
}

union! {
    /// Which model architecture to train.
    pub enum Model {
        /// A multilayer perceptron.
        "mlp" => Mlp(Mlp),
        /// A convolutional network.
        "conv" => Conv(Conv),
    }
}

record! {
    /// Training configuration.
    pub struct TrainCfg {
        /// Random seed.
        pub seed: i64 = 0,
        /// Model architecture.
        pub model: Model,
    }
}

#[test]
fn unions_dispatch_on_the_subcommand_name() {
    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<TrainCfg>("cfg")
        .parse_args(["--seed", "3", "mlp", "--model.hidden-dim", "128"])
        .unwrap();
    assert_eq!(
        ns.get::<TrainCfg>("cfg"),
        Some(&TrainCfg {
            seed: 3,
            model: Model::Mlp(Mlp { hidden_dim: 128 }),
        })
    );

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<TrainCfg>("cfg")
        .parse_args(["conv", "--model.stride", "2"])
        .unwrap();
    assert_eq!(
        ns.get::<TrainCfg>("cfg").unwrap().model,
        Model::Conv(Conv { kernel: 3, stride: 2 })
    );
}

#[test]
fn a_defaultless_union_requires_a_command() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<TrainCfg>("cfg")
        .parse_args(["--seed", "3"])
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("command is required"), "{text}");
    assert!(text.contains("mlp"), "{text}");
    assert!(text.contains("conv"), "{text}");
}

#[test]
fn unknown_commands_list_the_alternatives() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<TrainCfg>("cfg")
        .parse_args(["tree"])
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("tree"), "{text}");
    assert!(text.contains("mlp"), "{text}");
}

#[test]
fn union_defaults_apply_when_no_command_is_given() {
    record! {
        pub struct Pipeline {
            /// Model architecture.
            pub model: Model = Model::Conv(Conv { kernel: 5, stride: 1 }),
        }
    }

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Pipeline>("p")
        .parse_args(Vec::<String>::new())
        .unwrap();
    assert_eq!(
        ns.get::<Pipeline>("p").unwrap().model,
        Model::Conv(Conv { kernel: 5, stride: 1 })
    );
}

#[test]
fn optional_unions_stay_absent_without_a_command() {
    record! {
        pub struct Maybe {
            /// Optional model architecture.
            pub model: Option<Model> = None,
        }
    }

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Maybe>("m")
        .parse_args(Vec::<String>::new())
        .unwrap();
    assert_eq!(ns.get::<Maybe>("m").unwrap().model, None);

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Maybe>("m")
        .parse_args(["mlp"])
        .unwrap();
    assert_eq!(
        ns.get::<Maybe>("m").unwrap().model,
        Some(Model::Mlp(Mlp { hidden_dim: 64 }))
    );
}

#[test]
fn union_values_encode_their_tag() {
    let model = Model::Mlp(Mlp { hidden_dim: 7 });
    let (tag, fields) = model.to_tagged();
    assert_eq!(tag, "mlp");
    assert_eq!(fields.len(), 1);
    let rebuilt = Model::from_tagged(tag, &fields).unwrap();
    assert_eq!(rebuilt, model);
}

#[test]
fn sequences_of_records_are_rejected_up_front() {
    record! {
        pub struct Fleet {
            /// All the models.
            pub models: Vec<Mlp> = Vec::new(),
        }
    }

    let err = ArgumentParser::with_prog("fleet")
        .add_arguments::<Fleet>("f")
        .parse_args(Vec::<String>::new())
        .unwrap_err();
    assert!(matches!(err, ParseError::UnsupportedType { .. }), "{err}");
    assert!(err.to_string().contains("sequences of record types"));
}

#[test]
fn unions_cannot_serve_multiple_destinations() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<TrainCfg>("a")
        .add_arguments::<TrainCfg>("b")
        .parse_args(["mlp"])
        .unwrap_err();
    assert!(err.to_string().contains("multiple destinations"), "{err}");
}

#[test]
fn round_trip_includes_nested_and_union_values() {
    let cfg = TrainCfg {
        seed: 9,
        model: Model::Conv(Conv { kernel: 7, stride: 2 }),
    };
    assert_eq!(TrainCfg::from_map(&cfg.to_map()).unwrap(), cfg);
    let config = Config {
        name: "n".to_string(),
        net: Net {
            hidden_dim: 1,
            depth: 9,
        },
    };
    assert_eq!(Config::from_map(&config.to_map()).unwrap(), config);
}
