//! Loading, defaulting, and validation of the apps.yaml file.

use std::collections::HashSet;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use super::schema::{AppSpec, DeployConfig};

const DEFAULT_IMAGE_TAG: &str = "latest";
const DEFAULT_SCALING_MAX: i32 = 1;
const DEFAULT_CONCURRENCY: i32 = 80;
const DEFAULT_CPU: &str = "1000m";
const DEFAULT_MEMORY: &str = "256Mi";

#[derive(Deserialize)]
struct AppsFile {
    #[serde(default)]
    apps: Vec<AppSpec>,
}

/// Load and resolve the deployment configuration from a YAML file.
pub fn load(
    path: &Path,
    project: &str,
    region: &str,
    repository: &str,
) -> anyhow::Result<DeployConfig> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse(&data, project, region, repository)
        .with_context(|| format!("Invalid config file: {}", path.display()))
}

/// Parse raw YAML into a resolved configuration.
///
/// Applies defaults (image name, tag, scaling bounds, limits), resolves
/// each app's fully qualified image URL, and validates the set.
pub fn parse(
    data: &str,
    project: &str,
    region: &str,
    repository: &str,
) -> anyhow::Result<DeployConfig> {
    let file: AppsFile = serde_yaml::from_str(data).context("Failed to parse YAML")?;

    let mut config = DeployConfig {
        project: project.to_string(),
        region: region.to_string(),
        repository: repository.to_string(),
        apps: file.apps,
    };

    for app in &mut config.apps {
        if app.image_tag.is_empty() {
            app.image_tag = DEFAULT_IMAGE_TAG.to_string();
        }
        if app.image.is_empty() {
            app.image = app.name.clone();
        }
        app.image_url = format!(
            "{}-docker.pkg.dev/{}/{}/{}:{}",
            config.region, config.project, config.repository, app.image, app.image_tag
        );

        if app.scaling.max == 0 {
            app.scaling.max = DEFAULT_SCALING_MAX;
        }
        if app.scaling.concurrency == 0 {
            app.scaling.concurrency = DEFAULT_CONCURRENCY;
        }
        if app.limits.cpu.is_empty() {
            app.limits.cpu = DEFAULT_CPU.to_string();
        }
        if app.limits.memory.is_empty() {
            app.limits.memory = DEFAULT_MEMORY.to_string();
        }
    }

    validate(&config)?;

    Ok(config)
}

fn validate(config: &DeployConfig) -> anyhow::Result<()> {
    if config.apps.is_empty() {
        anyhow::bail!("At least one app must be defined");
    }

    let mut names = HashSet::new();
    for app in &config.apps {
        if app.name.is_empty() {
            anyhow::bail!("App name is a required field");
        }
        if !names.insert(app.name.as_str()) {
            anyhow::bail!("App names must be unique: '{}' is declared twice", app.name);
        }
    }

    Ok(())
}
