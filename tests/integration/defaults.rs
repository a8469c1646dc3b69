use recli::{record, ArgumentParser, ParseError, Record, Value, ValueMap, WrapperArena};

record! {
    /// Optimizer settings.
    pub struct Optim {
        /// Learning rate.
        pub rate: f64 = 0.001,
        /// Momentum factor.
        pub momentum: f64 = 0.9,
    }
}

record! {
    /// Training settings.
    pub struct Train {
        /// Number of epochs.
        pub epochs: i64 = 10,
        /// Optimizer settings.
        pub optim: Optim = Optim { rate: 0.001, momentum: 0.9 },
    }
}

#[test]
fn a_default_instance_replaces_schema_defaults() {
    let default = Train {
        epochs: 50,
        optim: Optim {
            rate: 0.1,
            momentum: 0.8,
        },
    };
    let ns = ArgumentParser::with_prog("train")
        .add_arguments_with_default::<Train>("t", &default)
        .parse_args(["--optim.momentum", "0.5"])
        .unwrap();
    assert_eq!(
        ns.get::<Train>("t"),
        Some(&Train {
            epochs: 50,
            optim: Optim {
                rate: 0.1,
                momentum: 0.5,
            },
        })
    );
}

#[test]
fn excess_default_keys_are_an_error() {
    let mut arena = WrapperArena::new();
    let id = arena
        .build(Train::schema(), vec!["t".to_string()])
        .unwrap();

    let mut overlay = ValueMap::new();
    overlay.insert("epochs".to_string(), Value::Integer(5));
    overlay.insert("_type_".to_string(), Value::String("Train".into()));
    overlay.insert("warmup".to_string(), Value::Integer(1));
    overlay.insert("decay".to_string(), Value::Float(0.1));

    let err = arena.set_default(id, 0, &overlay).unwrap_err();
    match err {
        ParseError::UnknownDefaultKeys {
            keys,
            type_name,
            dest,
        } => {
            // Sorted, and with the discriminant key silently dropped.
            assert_eq!(keys, vec!["decay".to_string(), "warmup".to_string()]);
            assert_eq!(type_name, "Train");
            assert_eq!(dest, "t");
        }
        other => panic!("expected UnknownDefaultKeys, got {other}"),
    }
}

#[test]
fn defaults_show_up_in_help_and_parsing_alike() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Train>("t")
        .parse_args(["--help"])
        .unwrap_err();
    let text = err.help_text().unwrap_or_default().to_string();
    assert!(text.contains("(default: 10)"), "{text}");
    assert!(text.contains("(default: 0.9)"), "{text}");

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Train>("t")
        .parse_args(Vec::<String>::new())
        .unwrap();
    assert_eq!(ns.get::<Train>("t").unwrap().epochs, 10);
}

#[test]
fn hand_registered_options_land_in_extras() {
    use recli::{Arity, OptionDecl, ScalarKind, ValueParser};

    let decl = OptionDecl {
        dest: "log_level".to_string(),
        flag: "--log-level".to_string(),
        arity: Arity::ExactlyOne,
        parser: ValueParser::Scalar(ScalarKind::String),
        default: Some(Value::String("info".to_string())),
        required: false,
        help: Some("Logging verbosity.".to_string()),
    };

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Train>("t")
        .add_option(decl.clone())
        .parse_args(["--log-level", "debug"])
        .unwrap();
    assert_eq!(ns.extra("log_level"), Some(&Value::String("debug".into())));

    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Train>("t")
        .add_option(decl)
        .parse_args(Vec::<String>::new())
        .unwrap();
    assert_eq!(ns.extra("log_level"), Some(&Value::String("info".into())));
}
