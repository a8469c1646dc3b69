use std::path::PathBuf;

use recli::{choice, record, ArgumentParser, Record};

choice! {
    /// Optimizer family.
    pub enum Optimizer {
        /// Stochastic gradient descent.
        Sgd,
        /// Adaptive moments.
        Adam,
    }
}

record! {
    /// Training hyper-parameters.
    pub struct Hparams {
        /// Random seed.
        pub seed: i64 = 13,
        /// Learning rate.
        pub rate: f64,
        /// Optimizer to use.
        pub optimizer: Optimizer = Optimizer::Sgd,
        /// Layer sizes.
        pub layers: Vec<i64> = vec![128, 64],
        /// Optional checkpoint to resume from.
        pub checkpoint: Option<PathBuf> = None,
    }
}

#[test]
fn defaults_fill_everything_not_supplied() {
    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(["--rate", "0.1"])
        .unwrap();
    assert_eq!(
        ns.get::<Hparams>("hp"),
        Some(&Hparams {
            seed: 13,
            rate: 0.1,
            optimizer: Optimizer::Sgd,
            layers: vec![128, 64],
            checkpoint: None,
        })
    );
}

#[test]
fn every_field_kind_parses_from_flags() {
    let ns = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args([
            "--seed",
            "42",
            "--rate=0.5",
            "--optimizer",
            "Adam",
            "--layers",
            "32",
            "16",
            "--checkpoint",
            "runs/last.ckpt",
        ])
        .unwrap();
    let hp = ns.get::<Hparams>("hp").unwrap();
    assert_eq!(hp.seed, 42);
    assert_eq!(hp.rate, 0.5);
    assert_eq!(hp.optimizer, Optimizer::Adam);
    assert_eq!(hp.layers, vec![32, 16]);
    assert_eq!(hp.checkpoint, Some(PathBuf::from("runs/last.ckpt")));
}

#[test]
fn missing_required_options_name_their_flags() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(Vec::<String>::new())
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("required"), "{text}");
    assert!(text.contains("--rate"), "{text}");
}

#[test]
fn invalid_values_report_flag_and_token() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(["--rate", "fast"])
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("--rate"), "{text}");
    assert!(text.contains("fast"), "{text}");
    assert!(text.contains("a float"), "{text}");
}

#[test]
fn choices_reject_unknown_variant_names() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(["--rate", "0.1", "--optimizer", "Nadam"])
        .unwrap_err();
    let text = err.to_string();
    assert!(text.contains("Nadam"), "{text}");
    assert!(text.contains("Sgd"), "{text}");
}

#[test]
fn variant_names_survive_the_trip_exactly() {
    for (token, expected) in [("Sgd", Optimizer::Sgd), ("Adam", Optimizer::Adam)] {
        let ns = ArgumentParser::with_prog("train")
            .add_arguments::<Hparams>("hp")
            .parse_args(["--rate", "0.1", "--optimizer", token])
            .unwrap();
        assert_eq!(ns.get::<Hparams>("hp").unwrap().optimizer, expected);
    }
}

#[test]
fn map_round_trip_is_the_identity() {
    let instances = [
        Hparams {
            seed: 0,
            rate: 1e-4,
            optimizer: Optimizer::Adam,
            layers: Vec::new(),
            checkpoint: None,
        },
        Hparams {
            seed: -7,
            rate: 0.9,
            optimizer: Optimizer::Sgd,
            layers: vec![1],
            checkpoint: Some(PathBuf::from("/tmp/x")),
        },
    ];
    for instance in instances {
        assert_eq!(Hparams::from_map(&instance.to_map()).unwrap(), instance);
    }
}

#[test]
fn unexpected_bare_tokens_are_errors() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(["--rate", "0.1", "extra"])
        .unwrap_err();
    assert!(err.to_string().contains("unexpected argument"));
}
