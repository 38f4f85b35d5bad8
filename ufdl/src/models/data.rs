//! Resources of the server's core API: accounts, projects, licences and datasets.

use super::{Named, Resource, SoftDelete};
use crate::types::{Pk, Username};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Membership of a user in a team.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Membership {
    /// Set when listed on a user.
    #[serde(default)]
    pub team: Option<String>,
    /// Set when listed on a team.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub permissions: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct User {
    pub pk: Pk,
    pub username: Username,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub memberships: Vec<Membership>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub date_joined: Option<OffsetDateTime>,
}

#[derive(Serialize)]
pub struct NewUser {
    pub username: Username,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl Resource for User {
    const PATH: &'static str = "v1/core/users/";
    const SOFT_DELETE: bool = true;
    type New = NewUser;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl SoftDelete for User {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Team {
    pub pk: Pk,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Membership>,
    #[serde(default)]
    pub creator: Option<Pk>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub creation_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deletion_time: Option<OffsetDateTime>,
}

#[derive(Serialize)]
pub struct NewTeam {
    pub name: String,
}

impl Resource for Team {
    const PATH: &'static str = "v1/core/teams/";
    const SOFT_DELETE: bool = true;
    type New = NewTeam;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl SoftDelete for Team {}

impl Named for Team {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Project {
    pub pk: Pk,
    pub name: String,
    pub team: Pk,
    #[serde(default)]
    pub creator: Option<Pk>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub creation_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deletion_time: Option<OffsetDateTime>,
}

#[derive(Serialize)]
pub struct NewProject {
    pub name: String,
    pub team: Pk,
}

impl Resource for Project {
    const PATH: &'static str = "v1/core/projects/";
    const SOFT_DELETE: bool = true;
    type New = NewProject;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl SoftDelete for Project {}

impl Named for Project {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Licence under which datasets are published.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Licence {
    pub pk: Pk,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
}

#[derive(Serialize)]
pub struct NewLicence {
    pub name: String,
    pub url: String,
}

impl Resource for Licence {
    const PATH: &'static str = "v1/core/licences/";
    type New = NewLicence;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl Named for Licence {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Data domain, e.g. image classification.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Domain {
    pub pk: Pk,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Serialize)]
pub struct NewDomain {
    pub name: String,
    pub description: String,
}

impl Resource for Domain {
    const PATH: &'static str = "v1/core/domains/";
    type New = NewDomain;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl Named for Domain {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Deep learning framework, e.g. `pytorch` version `1.6.0`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Framework {
    pub pk: Pk,
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Serialize)]
pub struct NewFramework {
    pub name: String,
    pub version: String,
}

impl Resource for Framework {
    const PATH: &'static str = "v1/core/frameworks/";
    type New = NewFramework;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl Named for Framework {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Worker node which executes jobs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Node {
    pub pk: Pk,
    pub ip: String,
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub driver_version: Option<String>,
    #[serde(default)]
    pub hardware_generation: Option<String>,
    #[serde(default)]
    pub gpu_mem: Option<u64>,
    #[serde(default)]
    pub cpu_mem: Option<u64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_seen: Option<OffsetDateTime>,
    #[serde(default)]
    pub current_job: Option<Pk>,
}

#[derive(Serialize)]
pub struct NewNode {
    pub ip: String,
    pub index: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hardware_generation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gpu_mem: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_mem: Option<u64>,
}

impl Resource for Node {
    const PATH: &'static str = "v1/core/nodes/";
    type New = NewNode;

    fn pk(&self) -> Pk {
        self.pk
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Dataset {
    pub pk: Pk,
    pub project: Pk,
    pub name: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub previous_version: Option<Pk>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub licence: Option<Pk>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub creator: Option<Pk>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub creation_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deletion_time: Option<OffsetDateTime>,
}

impl Dataset {
    pub fn is_deleted(&self) -> bool {
        self.deletion_time.is_some()
    }
}

#[derive(Serialize)]
pub struct NewDataset {
    pub name: String,
    pub project: Pk,
    pub licence: Pk,
    pub description: String,
    pub is_public: bool,
    pub tags: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

impl Resource for Dataset {
    const PATH: &'static str = "v1/core/datasets/";
    const SOFT_DELETE: bool = true;
    type New = NewDataset;

    fn pk(&self) -> Pk {
        self.pk
    }
}

impl SoftDelete for Dataset {}
