//! Resources for running jobs: docker images, job templates and jobs.

use super::{Contract, Named, Resource, SoftDelete};
use crate::types::Pk;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Docker image in which jobs execute.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DockerImage {
    pub pk: Pk,
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub registry_url: String,
    #[serde(default)]
    pub registry_username: Option<String>,
    #[serde(default)]
    pub cuda_version: Option<String>,
    #[serde(default)]
    pub framework: Option<Pk>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    #[serde(default)]
    pub min_hardware_generation: Option<String>,
    #[serde(default)]
    pub cpu: bool,
}

#[derive(Serialize)]
pub struct NewDockerImage {
    pub name: String,
    pub version: String,
    pub url: String,
    pub registry_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_password: Option<String>,
    pub cuda_version: String,
    pub framework: Pk,
    pub domain: String,
    pub tasks: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_hardware_generation: Option<String>,
    pub cpu: bool,
}

impl Resource for DockerImage {
    const PATH: &'static str = "v1/docker/";
    type New = NewDockerImage;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl Named for DockerImage {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Template from which jobs are created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JobTemplate {
    pub pk: Pk,
    pub name: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub framework: Option<Pk>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, rename = "type")]
    pub contract_name: Option<String>,
    #[serde(default)]
    pub executor_class: String,
    #[serde(default)]
    pub required_packages: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub creation_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deletion_time: Option<OffsetDateTime>,
}

impl JobTemplate {
    /// The contract this template fulfils, if the server named a known one.
    pub fn contract(&self) -> Option<Contract> {
        self.contract_name.as_deref().and_then(|c| c.parse().ok())
    }
}

#[derive(Serialize)]
pub struct NewJobTemplate {
    pub name: String,
    pub version: u32,
    pub description: String,
    pub scope: String,
    pub framework: Pk,
    pub domain: String,
    #[serde(rename = "type")]
    pub contract: Contract,
    pub executor_class: String,
    pub required_packages: String,
    pub body: String,
}

impl Resource for JobTemplate {
    const PATH: &'static str = "v1/job-templates/";
    const SOFT_DELETE: bool = true;
    type New = NewJobTemplate;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl SoftDelete for JobTemplate {}

impl Named for JobTemplate {
    fn name(&self) -> &str {
        &self.name
    }
}

/// A named output produced by a job.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobOutput {
    pub pk: Pk,
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Job {
    pub pk: Pk,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub job_template: Option<Pk>,
    #[serde(default)]
    pub docker_image: Option<Pk>,
    #[serde(default)]
    pub input_values: Value,
    #[serde(default)]
    pub parameter_values: Value,
    #[serde(default)]
    pub node: Option<Pk>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    #[serde(default)]
    pub error_reason: Option<String>,
    #[serde(default)]
    pub outputs: Vec<JobOutput>,
    #[serde(default)]
    pub creator: Option<Pk>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub creation_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deletion_time: Option<OffsetDateTime>,
}

impl Job {
    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    pub fn output(&self, name: &str) -> Option<&JobOutput> {
        self.outputs.iter().find(|o| o.name == name)
    }
}

/// Body for creating a job from a [JobTemplate].
#[derive(Serialize)]
pub struct NewJob {
    pub docker_image: Pk,
    pub input_values: Value,
    pub parameter_values: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Resource for Job {
    const PATH: &'static str = "v1/jobs/";
    const SOFT_DELETE: bool = true;
    /// Jobs are created from job templates, so a raw body is accepted here.
    type New = Value;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl SoftDelete for Job {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_template_contract() {
        let template: JobTemplate = serde_json::from_value(json!({
            "pk": 1,
            "name": "mmdet-train",
            "type": "Train"
        }))
        .unwrap();
        assert_eq!(template.contract(), Some(Contract::Train));

        let unknown: JobTemplate =
            serde_json::from_value(json!({"pk": 2, "name": "x", "type": "Evaluate"})).unwrap();
        assert_eq!(unknown.contract(), None);
    }

    #[test]
    fn test_job_outputs() {
        let job: Job = serde_json::from_value(json!({
            "pk": 7,
            "outputs": [{"pk": 1, "name": "model", "type": "pth"}],
            "end_time": "2021-06-01T12:00:00Z"
        }))
        .unwrap();
        assert!(job.is_finished());
        assert_eq!(job.output("model").unwrap().output_type, "pth");
        assert!(job.output("log").is_none());
        assert_eq!(job.input_values, Value::Null);
    }
}
