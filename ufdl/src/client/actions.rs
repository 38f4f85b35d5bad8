use super::connection::Connection;
use crate::errors::{check, UfdlError};
use crate::filter::{Expression, Filter};
use crate::models::{Named, Resource, SoftDelete};
use crate::types::Pk;
use reqwest::{Method, StatusCode};
use reqwest_middleware::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// Client for the collection of one kind of [Resource].
///
/// All methods make exactly one request (plus authentication retries, see
/// [crate::auth::BearerAuth]). Error responses become [UfdlError::Error].
pub struct Actions<'a, R: Resource> {
    pub(crate) conn: &'a Connection,
    phantom: PhantomData<R>,
}

impl<'a, R: Resource> Actions<'a, R> {
    pub(crate) fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            phantom: Default::default(),
        }
    }

    /// List resources matching `filter`, or all resources.
    pub async fn list(&self, filter: Option<&Filter>) -> Result<Vec<R>, UfdlError> {
        let everything = Filter::new();
        let filter = filter.unwrap_or(&everything);
        fetch(self.request(Method::POST, &["list"])?.json(filter)).await
    }

    /// Get a resource by its primary key. Returns `None` if it does not exist.
    pub async fn load(&self, pk: Pk) -> Result<Option<R>, UfdlError> {
        let res = self.item(Method::GET, pk, &[])?.send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(res).await?.json().await?))
    }

    /// Get the current state of `resource` from the server. Returns `None` if
    /// it was deleted in the meantime.
    pub async fn reload(&self, resource: &R) -> Result<Option<R>, UfdlError> {
        self.load(resource.pk()).await
    }

    /// Get the first resource whose `field` is exactly `value`.
    pub async fn load_by(&self, field: &str, value: &str) -> Result<Option<R>, UfdlError> {
        let value = non_empty(field, value)?;
        let filter = Filter::from(Expression::exact_string(field, value, false)?);
        Ok(self.list(Some(&filter)).await?.into_iter().next())
    }

    pub async fn create(&self, new: &R::New) -> Result<R, UfdlError> {
        fetch(self.request(Method::POST, &[])?.json(new)).await
    }

    /// Replace all fields of a resource.
    pub async fn update(&self, pk: Pk, new: &R::New) -> Result<R, UfdlError> {
        fetch(self.item(Method::PUT, pk, &[])?.json(new)).await
    }

    /// Change only the fields present in `fields`.
    pub async fn partial_update<B: Serialize + ?Sized>(
        &self,
        pk: Pk,
        fields: &B,
    ) -> Result<R, UfdlError> {
        fetch(self.item(Method::PATCH, pk, &[])?.json(fields)).await
    }

    /// Delete a resource. Soft-deletable resources are only marked as deleted
    /// unless `hard` is set; other resources are always removed.
    ///
    /// Returns `false` if the resource does not exist.
    pub async fn delete(&self, pk: Pk, hard: bool) -> Result<bool, UfdlError> {
        let segments: &[&str] = if hard && R::SOFT_DELETE { &["hard"] } else { &[] };
        let req = self.item(Method::DELETE, pk, segments)?;
        found(req).await
    }

    pub(crate) fn request(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<RequestBuilder, UfdlError> {
        self.conn.request(method, R::PATH, segments)
    }

    /// Request to `{PATH}{pk}/{segments...}`.
    pub(crate) fn item(
        &self,
        method: Method,
        pk: Pk,
        segments: &[&str],
    ) -> Result<RequestBuilder, UfdlError> {
        let pk = pk.to_string();
        self.conn.request(method, R::PATH, &item_segments(&pk, segments))
    }

    /// Like [Actions::item], for uploading or downloading files.
    pub(crate) fn transfer(
        &self,
        method: Method,
        pk: Pk,
        segments: &[&str],
    ) -> Result<RequestBuilder, UfdlError> {
        let pk = pk.to_string();
        self.conn.transfer(method, R::PATH, &item_segments(&pk, segments))
    }
}

fn item_segments<'s>(pk: &'s str, segments: &[&'s str]) -> Vec<&'s str> {
    std::iter::once(pk).chain(segments.iter().copied()).collect()
}

impl<R: SoftDelete> Actions<'_, R> {
    /// Undo a soft delete. Returns `false` if the resource does not exist.
    pub async fn reinstate(&self, pk: Pk) -> Result<bool, UfdlError> {
        let req = self.item(Method::DELETE, pk, &["reinstate"])?;
        found(req).await
    }
}

impl<R: Named> Actions<'_, R> {
    /// Get a resource by its name.
    pub async fn load_by_name(&self, name: &str) -> Result<Option<R>, UfdlError> {
        self.load_by("name", name).await
    }
}

/// Send `req` and decode the JSON response.
pub(crate) async fn fetch<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, UfdlError> {
    let res = req.send().await?;
    Ok(check(res).await?.json().await?)
}

/// Send `req`, answering whether the resource was found.
pub(crate) async fn found(req: RequestBuilder) -> Result<bool, UfdlError> {
    let res = req.send().await?;
    if res.status() == StatusCode::NOT_FOUND {
        return Ok(false);
    }
    check(res).await?;
    Ok(true)
}

/// Reject empty names before making a request.
pub(crate) fn non_empty<'s>(what: &str, value: &'s str) -> Result<&'s str, UfdlError> {
    if value.is_empty() {
        Err(UfdlError::InvalidArgument(format!("{} must not be empty", what)))
    } else {
        Ok(value)
    }
}
