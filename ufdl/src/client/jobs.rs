use super::actions::{fetch, found, non_empty, Actions};
use super::transfer;
use crate::errors::UfdlError;
use crate::models::{Job, JobTemplate, NewJob};
use crate::types::Pk;
use bytes::Bytes;
use reqwest::Method;

impl Actions<'_, Job> {
    /// Get the content of an output of a job.
    pub async fn get_output(
        &self,
        pk: Pk,
        name: &str,
        output_type: &str,
    ) -> Result<Bytes, UfdlError> {
        let segments = output_segments(name, output_type)?;
        let req = self.transfer(Method::GET, pk, &segments)?;
        transfer::receive(req, self.conn.idle_timeout()).await
    }

    /// Returns `false` if the job or the output does not exist.
    pub async fn delete_output(
        &self,
        pk: Pk,
        name: &str,
        output_type: &str,
    ) -> Result<bool, UfdlError> {
        let segments = output_segments(name, output_type)?;
        found(self.item(Method::DELETE, pk, &segments)?).await
    }
}

fn output_segments<'a>(name: &'a str, output_type: &'a str) -> Result<[&'a str; 3], UfdlError> {
    Ok([
        "outputs",
        non_empty("output name", name)?,
        non_empty("output type", output_type)?,
    ])
}

impl Actions<'_, JobTemplate> {
    /// Create a job from the template `pk`.
    pub async fn create_job(&self, pk: Pk, job: &NewJob) -> Result<Job, UfdlError> {
        fetch(self.item(Method::POST, pk, &["create-job"])?.json(job)).await
    }
}
