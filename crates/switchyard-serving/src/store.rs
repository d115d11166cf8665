//! Resource store bound to the single managed InferenceService
//!
//! Provides a trait-based abstraction over the four cluster operations so the
//! activation state machine can be tested without a cluster, while production
//! code talks to the API server through `kube::Api<DynamicObject>`.

use async_trait::async_trait;
use kube::api::{Api, DeleteParams, DynamicObject, PostParams};
use kube::Client;
use serde_json::Value;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use switchyard_common::kube_utils::{build_api_resource, is_not_found};
use switchyard_common::INFERENCE_SERVICE_KIND;

use crate::manifest::api_version;
use crate::{ActivationError, ServingTarget};

/// Outcome of a delete call
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deletion {
    /// The resource existed and deletion was accepted
    Deleted,
    /// There was nothing to delete
    NotFound,
}

/// Cluster operations on exactly one (namespace, name) InferenceService slot
///
/// "Not found" is never an error here: `get` returns `None` and `delete`
/// returns [`Deletion::NotFound`]. Every other failure is returned unchanged.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read the live object
    async fn get(&self) -> Result<Option<Value>, ActivationError>;

    /// Create the object from `manifest`
    async fn create(&self, manifest: &Value, dry_run: bool) -> Result<Value, ActivationError>;

    /// Replace the object with `manifest`, which must carry a resourceVersion
    async fn replace(&self, manifest: &Value, dry_run: bool) -> Result<Value, ActivationError>;

    /// Delete the object
    async fn delete(&self) -> Result<Deletion, ActivationError>;
}

/// [`ResourceStore`] backed by the Kubernetes API
pub struct KubeResourceStore {
    api: Api<DynamicObject>,
    target: ServingTarget,
}

impl KubeResourceStore {
    /// Bind a store to `target` using `client`
    pub fn new(client: Client, target: ServingTarget) -> Self {
        let ar = build_api_resource(&api_version(), INFERENCE_SERVICE_KIND);
        let api = Api::namespaced_with(client, &target.namespace, &ar);
        Self { api, target }
    }

    fn to_object(manifest: &Value) -> Result<DynamicObject, ActivationError> {
        serde_json::from_value(manifest.clone()).map_err(|e| {
            ActivationError::Serialization(format!("invalid InferenceService manifest: {}", e))
        })
    }

    fn to_value(object: &DynamicObject) -> Result<Value, ActivationError> {
        serde_json::to_value(object).map_err(|e| {
            ActivationError::Serialization(format!("failed to encode InferenceService: {}", e))
        })
    }

    fn post_params(dry_run: bool) -> PostParams {
        PostParams {
            dry_run,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ResourceStore for KubeResourceStore {
    async fn get(&self) -> Result<Option<Value>, ActivationError> {
        let object = self
            .api
            .get_opt(&self.target.name)
            .await
            .map_err(|e| ActivationError::kube("get", &self.target, e))?;
        object.as_ref().map(Self::to_value).transpose()
    }

    async fn create(&self, manifest: &Value, dry_run: bool) -> Result<Value, ActivationError> {
        let object = Self::to_object(manifest)?;
        debug!(resource = %self.target, dry_run, "Creating InferenceService");
        let created = self
            .api
            .create(&Self::post_params(dry_run), &object)
            .await
            .map_err(|e| ActivationError::kube("create", &self.target, e))?;
        Self::to_value(&created)
    }

    async fn replace(&self, manifest: &Value, dry_run: bool) -> Result<Value, ActivationError> {
        let object = Self::to_object(manifest)?;
        debug!(resource = %self.target, dry_run, "Replacing InferenceService");
        let replaced = self
            .api
            .replace(&self.target.name, &Self::post_params(dry_run), &object)
            .await
            .map_err(|e| ActivationError::kube("replace", &self.target, e))?;
        Self::to_value(&replaced)
    }

    async fn delete(&self) -> Result<Deletion, ActivationError> {
        match self
            .api
            .delete(&self.target.name, &DeleteParams::default())
            .await
        {
            Ok(_) => Ok(Deletion::Deleted),
            Err(e) if is_not_found(&e) => Ok(Deletion::NotFound),
            Err(e) => Err(ActivationError::kube("delete", &self.target, e)),
        }
    }
}
