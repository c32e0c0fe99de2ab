use crate::{
    admission::{self, Admission, AdmissionReview},
    core::{Exclusions, Propagation},
    k8s::{labels::Map, validation, DynamicObject, Labels, Namespace, Object},
};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[clap(
    name = "hnc-propagation",
    about = "Evaluates hierarchical namespace propagation annotations"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "hnc_propagation=info,warn",
        env = "HNC_PROPAGATION_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain", env = "HNC_PROPAGATION_LOG_FORMAT")]
    log_format: kubert::LogFormat,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decides whether an object is propagated into a namespace.
    Check {
        /// Path to the object's YAML or JSON manifest.
        #[clap(long)]
        object: PathBuf,

        /// Path to the destination namespace's manifest. Its labels are merged
        /// with any `--namespace-label` values.
        #[clap(long)]
        namespace: Option<PathBuf>,

        /// A destination namespace label, as `key=value`. May be repeated.
        #[clap(long = "namespace-label")]
        namespace_labels: Vec<NamespaceLabel>,

        /// Disables the built-in exclusion rules.
        #[clap(long)]
        no_default_exclusions: bool,
    },

    /// Checks that an object's propagation annotations are valid.
    Validate {
        /// Path to the object's YAML or JSON manifest.
        #[clap(long)]
        object: PathBuf,
    },

    /// Answers an AdmissionReview, printing the response review as JSON.
    Review {
        /// Path to the AdmissionReview JSON document.
        #[clap(long)]
        review: PathBuf,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct NamespaceLabel {
    key: String,
    value: String,
}

// === impl Args ===

impl Args {
    #[inline]
    pub fn parse_and_run() -> Result<()> {
        Self::parse().run()
    }

    pub fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            command,
        } = self;

        log_format
            .try_init(log_level)
            .map_err(|error| anyhow!("failed to configure logging: {error}"))?;

        match command {
            Command::Check {
                object,
                namespace,
                namespace_labels,
                no_default_exclusions,
            } => {
                let verdict = check(
                    &object,
                    namespace.as_deref(),
                    namespace_labels,
                    no_default_exclusions,
                )?;
                println!("{verdict}");
            }

            Command::Validate { object } => {
                let obj = Object::from(read_manifest::<DynamicObject>(&object)?);
                admission::validate(&obj)
                    .with_context(|| format!("{} is invalid", object.display()))?;
                println!("valid");
            }

            Command::Review { review } => {
                let review = read_manifest::<AdmissionReview>(&review)?;
                let rsp = Admission::new().review(review);
                println!("{}", serde_json::to_string(&rsp)?);
            }
        }

        Ok(())
    }
}

/// Evaluates both queries for the object manifest at `object`, returning
/// `{"propagate": bool, "selectorExists": bool}`.
fn check(
    object: &Path,
    namespace: Option<&Path>,
    namespace_labels: Vec<NamespaceLabel>,
    no_default_exclusions: bool,
) -> Result<serde_json::Value> {
    let obj = Object::from(read_manifest::<DynamicObject>(object)?);
    let ns_labels = namespace_labels_from(namespace, namespace_labels)?;
    debug!(?obj, ?ns_labels);

    let exclusions = if no_default_exclusions {
        Exclusions::none()
    } else {
        Exclusions::default()
    };
    let propagation = Propagation::new(exclusions);

    let selector_exists = propagation.selector_exists(&obj, &ns_labels)?;
    let propagate = propagation.should_propagate(&obj, &ns_labels)?;
    info!(kind = %obj.kind(), name = %obj.name(), propagate, "Checked");
    Ok(serde_json::json!({
        "propagate": propagate,
        "selectorExists": selector_exists,
    }))
}

fn read_manifest<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn namespace_labels_from(
    namespace: Option<&Path>,
    extra: Vec<NamespaceLabel>,
) -> Result<Labels> {
    let mut labels = match namespace {
        Some(path) => read_manifest::<Namespace>(path)?
            .metadata
            .labels
            .unwrap_or_default(),
        None => Map::default(),
    };
    labels.extend(extra.into_iter().map(|l| (l.key, l.value)));
    Ok(labels.into())
}

// === impl NamespaceLabel ===

impl std::str::FromStr for NamespaceLabel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let Some((key, value)) = s.split_once('=') else {
            bail!("namespace label must be formatted as key=value: {s:?}");
        };
        validation::validate_qualified_name(key)
            .with_context(|| format!("invalid namespace label key {key:?}"))?;
        validation::validate_label_value(value)
            .with_context(|| format!("invalid namespace label value {value:?}"))?;
        Ok(Self {
            key: key.to_string(),
            value: value.to_string(),
        })
    }
}
