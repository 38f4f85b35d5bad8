//! Dataset files, copies and merges.

use super::actions::{fetch, found, non_empty, Actions};
use super::transfer;
use crate::errors::{check, UfdlError};
use crate::filter::{Expression, Filter, OrderBy};
use crate::models::Dataset;
use crate::types::Pk;
use bytes::Bytes;
use camino::Utf8Path;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::Serialize;

#[derive(Serialize)]
struct CopyBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    new_name: Option<&'a str>,
}

#[derive(Serialize)]
struct MergeBody {
    delete: bool,
}

impl Actions<'_, Dataset> {
    /// Get a dataset of a project by name. Without `version`, the latest
    /// version is returned.
    pub async fn load_by_name(
        &self,
        project: Pk,
        name: &str,
        version: Option<u32>,
    ) -> Result<Option<Dataset>, UfdlError> {
        let name = non_empty("dataset name", name)?;
        let mut key = Expression::and([
            Expression::exact_number("project", project)?,
            Expression::exact_string("name", name, false)?,
        ])?;
        let filter = match version {
            Some(version) => {
                key.add_sub_expression(Expression::exact_number("version", version)?)?;
                Filter::from(key)
            }
            None => Filter::from(key).order_by(OrderBy::descending("version")?),
        };
        Ok(self.list(Some(&filter)).await?.into_iter().next())
    }

    /// Add a file to a dataset, replacing any file with the same name.
    ///
    /// Only connecting is limited in time, so large files can be uploaded over
    /// slow connections.
    pub async fn upload_file(
        &self,
        pk: Pk,
        name: &str,
        data: impl Into<Bytes>,
    ) -> Result<(), UfdlError> {
        let name = non_empty("file name", name)?;
        let res = self
            .transfer(Method::POST, pk, &["files", name])?
            .header(CONTENT_TYPE, "application/data")
            .body(data.into())
            .send()
            .await?;
        check(res).await?;
        Ok(())
    }

    /// Upload a local file to a dataset as `name`.
    ///
    /// The whole file is read into memory so that the request can be sent
    /// again if authentication has to be renewed.
    pub async fn upload_file_from(
        &self,
        pk: Pk,
        name: &str,
        local_file: &Utf8Path,
    ) -> Result<(), UfdlError> {
        let data = fs_err::tokio::read(local_file.as_std_path()).await?;
        self.upload_file(pk, name, data).await
    }

    pub async fn download_file(&self, pk: Pk, name: &str) -> Result<Bytes, UfdlError> {
        let name = non_empty("file name", name)?;
        let req = self.transfer(Method::GET, pk, &["files", name])?;
        transfer::receive(req, self.conn.idle_timeout()).await
    }

    /// Returns `false` if the dataset or the file does not exist.
    pub async fn delete_file(&self, pk: Pk, name: &str) -> Result<bool, UfdlError> {
        let name = non_empty("file name", name)?;
        found(self.item(Method::DELETE, pk, &["files", name])?).await
    }

    /// Copy a dataset. The server picks a name if `new_name` is not given.
    pub async fn copy(&self, pk: Pk, new_name: Option<&str>) -> Result<Dataset, UfdlError> {
        let req = self
            .item(Method::POST, pk, &["copy"])?
            .json(&CopyBody { new_name });
        fetch(req).await
    }

    /// Merge the files of dataset `source` into dataset `pk`, optionally
    /// deleting `source` afterwards.
    pub async fn merge(&self, pk: Pk, source: Pk, delete: bool) -> Result<Dataset, UfdlError> {
        let source = source.to_string();
        let req = self
            .item(Method::POST, pk, &["merge", &source])?
            .json(&MergeBody { delete });
        fetch(req).await
    }

    /// Download a whole dataset as an archive.
    pub async fn download(&self, pk: Pk) -> Result<Bytes, UfdlError> {
        let req = self.transfer(Method::GET, pk, &["download"])?;
        transfer::receive(req, self.conn.idle_timeout()).await
    }

    /// Download a whole dataset to a local file, returning the number of bytes written.
    pub async fn download_to(&self, pk: Pk, dst: &Utf8Path) -> Result<u64, UfdlError> {
        let req = self.transfer(Method::GET, pk, &["download"])?;
        transfer::receive_to(req, self.conn.idle_timeout(), dst).await
    }
}
