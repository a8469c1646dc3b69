use recli::{choice, record, union, ArgumentParser};

choice! {
    /// Optimizer family.
    pub enum Optimizer {
        Sgd,
        Adam,
    }
}

record! {
    /// Training hyper-parameters.
    ///
    /// Everything that controls a single run.
    pub struct Hparams {
        /// Random seed.
        pub seed: i64 = 13,
        /// Learning rate.
        pub rate: f64,
        /// Optimizer to use.
        pub optimizer: Optimizer = Optimizer::Sgd,
    }
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
    }
}

union! {
    /// Which model to train.
    pub enum Model {
        /// A multilayer perceptron.
        "mlp" => MlpArch(Mlp),
        /// A convolutional network.
        "conv" => ConvArch(Conv),
    }
}

record! {
    /// Full run configuration.
    pub struct RunCfg {
        /// Model architecture.
        pub model: Model,
    }
}

fn help_text(parser: ArgumentParser) -> String {
    let err = parser.parse_args(["--help"]).unwrap_err();
    assert!(err.is_help_request());
    err.help_text().unwrap_or_default().to_string()
}

#[test]
fn help_shows_usage_groups_and_defaults() {
    let text = help_text(
        ArgumentParser::with_prog("train")
            .description("Train a model.")
            .add_arguments::<Hparams>("hp"),
    );
    let usage = text.lines().next().unwrap_or_default().to_string();
    assert!(usage.starts_with("usage: train [-h]"), "{usage}");
    assert!(usage.contains("[--seed INT]"), "{usage}");
    assert!(usage.contains("--rate FLOAT"), "{usage}");

    assert!(text.contains("Train a model."), "{text}");
    assert!(text.contains("Hparams ['hp']:"), "{text}");
    assert!(text.contains("Training hyper-parameters."), "{text}");
    assert!(text.contains("Random seed. (default: 13)"), "{text}");
    assert!(text.contains("Learning rate. (required)"), "{text}");
    assert!(text.contains("{Sgd,Adam}"), "{text}");
    assert!(text.contains("(default: Sgd)"), "{text}");
    assert!(text.contains("-h, --help"), "{text}");
}

#[test]
fn help_lists_subcommands_with_their_options() {
    let text = help_text(ArgumentParser::with_prog("train").add_arguments::<RunCfg>("cfg"));
    assert!(text.contains("commands:"), "{text}");
    assert!(text.contains("{mlp,conv}"), "{text}");
    assert!(text.contains("A multilayer perceptron."), "{text}");
    assert!(text.contains("--model.hidden-dim"), "{text}");
    assert!(text.contains("--model.kernel"), "{text}");
    assert!(text.contains("Mlp ['cfg.model']:"), "{text}");
}

#[test]
fn short_and_long_help_flags_are_equivalent() {
    let long = help_text(ArgumentParser::with_prog("train").add_arguments::<Hparams>("hp"));
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(["-h"])
        .unwrap_err();
    assert_eq!(Some(long.as_str()), err.help_text());
}

#[test]
fn help_wins_even_when_required_options_are_missing() {
    let err = ArgumentParser::with_prog("train")
        .add_arguments::<Hparams>("hp")
        .parse_args(["--help"])
        .unwrap_err();
    assert!(err.is_help_request());
}
