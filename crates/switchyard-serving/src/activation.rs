//! Activation state machine for the single managed InferenceService
//!
//! The managed resource is either Absent or Present. Activating a model under
//! the default `recreate` strategy always ends with a freshly created resource:
//! a present one is deleted first, and creation waits until the deletion is
//! observed. The only repeated attempt is that bounded deletion wait; every
//! other cluster call is made once and its failure returned unchanged.
//!
//! There is no internal locking. Concurrent activations against the same
//! resource can interleave; callers that need serialization provide it.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use switchyard_catalog::ModelDefinition;
use switchyard_common::{poll_until, Clock, PollError, PollPolicy, SystemClock};

use crate::manifest::{build_inference_service, ManifestOptions};
use crate::store::{Deletion, ResourceStore};
use crate::{ActivationError, ServingTarget};

/// How to activate a model when a resource is already present
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ActivationStrategy {
    /// Delete the live resource, wait until it is gone, then create
    #[default]
    Recreate,
    /// Replace the live resource in one call, carrying its resourceVersion
    InPlace,
}

impl FromStr for ActivationStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recreate" => Ok(Self::Recreate),
            "in-place" => Ok(Self::InPlace),
            other => Err(format!(
                "unknown activation strategy '{}' (expected 'recreate' or 'in-place')",
                other
            )),
        }
    }
}

impl fmt::Display for ActivationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Recreate => write!(f, "recreate"),
            Self::InPlace => write!(f, "in-place"),
        }
    }
}

/// What `activate` did to the cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivateAction {
    /// A new resource was created
    Created,
    /// The live resource was replaced in place
    Updated,
}

/// Result of a successful activation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivateResult {
    /// What happened
    pub action: ActivateAction,
    /// Name of the managed resource
    pub name: String,
}

/// What `deactivate` did to the cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeactivateAction {
    /// The resource existed and was deleted
    Deleted,
    /// There was no resource to delete
    AlreadyDeleted,
}

/// Result of a successful deactivation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeactivateResult {
    /// What happened
    pub action: DeactivateAction,
    /// Name of the managed resource
    pub name: String,
}

/// Which write a dry run validated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DryRunAction {
    /// Nothing exists yet; a create was validated
    Create,
    /// A resource exists; a replace was validated
    Update,
}

/// Result of a server-side dry run
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DryRunResult {
    /// Which write was validated
    pub action: DryRunAction,
    /// The rendered manifest
    pub manifest: Value,
}

/// Drives the managed InferenceService through activate / deactivate
pub struct ActivationClient {
    store: Arc<dyn ResourceStore>,
    target: ServingTarget,
    options: ManifestOptions,
    strategy: ActivationStrategy,
    poll: PollPolicy,
    clock: Arc<dyn Clock>,
}

impl ActivationClient {
    /// Create a client with default manifest options, strategy and deletion wait
    pub fn new(store: Arc<dyn ResourceStore>, target: ServingTarget) -> Self {
        Self {
            store,
            target,
            options: ManifestOptions::default(),
            strategy: ActivationStrategy::default(),
            poll: PollPolicy::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Set manifest options
    pub fn with_options(mut self, options: ManifestOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the activation strategy
    pub fn with_strategy(mut self, strategy: ActivationStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the deletion wait interval and timeout
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    /// Set the clock used for the deletion wait
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The managed resource
    pub fn target(&self) -> &ServingTarget {
        &self.target
    }

    /// Render the manifest `activate` would submit for `definition`
    pub fn render(&self, definition: &ModelDefinition) -> Value {
        build_inference_service(definition, &self.target, &self.options)
    }

    /// Make `definition` the active model.
    ///
    /// Under `recreate`, a present resource is deleted and the call blocks until
    /// it is gone or the deletion wait times out. On timeout nothing is created.
    pub async fn activate(
        &self,
        definition: &ModelDefinition,
    ) -> Result<ActivateResult, ActivationError> {
        let manifest = self.render(definition);
        let existing = self.store.get().await?;

        info!(
            model = %definition.id,
            resource = %self.target,
            present = existing.is_some(),
            strategy = %self.strategy,
            "Activating model"
        );

        let action = match (existing, self.strategy) {
            (None, _) => {
                self.store.create(&manifest, false).await?;
                ActivateAction::Created
            }
            (Some(_), ActivationStrategy::Recreate) => {
                self.delete_and_wait().await?;
                self.store.create(&manifest, false).await?;
                ActivateAction::Created
            }
            (Some(live), ActivationStrategy::InPlace) => {
                let manifest = with_resource_version(manifest, &live);
                self.store.replace(&manifest, false).await?;
                ActivateAction::Updated
            }
        };

        info!(model = %definition.id, resource = %self.target, ?action, "Model activated");
        Ok(ActivateResult {
            action,
            name: self.target.name.clone(),
        })
    }

    /// Delete the managed resource. Deleting an absent resource succeeds.
    pub async fn deactivate(&self) -> Result<DeactivateResult, ActivationError> {
        let action = match self.store.delete().await? {
            Deletion::Deleted => {
                info!(resource = %self.target, "InferenceService deleted");
                DeactivateAction::Deleted
            }
            Deletion::NotFound => {
                info!(resource = %self.target, "InferenceService already absent");
                DeactivateAction::AlreadyDeleted
            }
        };

        Ok(DeactivateResult {
            action,
            name: self.target.name.clone(),
        })
    }

    /// The live resource, or `None` when nothing is active
    pub async fn get_active(&self) -> Result<Option<Value>, ActivationError> {
        self.store.get().await
    }

    /// Validate the manifest for `definition` with a server-side dry run.
    ///
    /// Tries a create first; if the resource already exists, validates a
    /// replace carrying the live resourceVersion instead. Nothing is persisted.
    pub async fn dry_run(
        &self,
        definition: &ModelDefinition,
    ) -> Result<DryRunResult, ActivationError> {
        let manifest = self.render(definition);

        let action = match self.store.create(&manifest, true).await {
            Ok(_) => DryRunAction::Create,
            Err(e) if e.is_conflict() => {
                debug!(resource = %self.target, "Resource exists, validating replace");
                let replacement = match self.store.get().await? {
                    Some(live) => with_resource_version(manifest.clone(), &live),
                    None => manifest.clone(),
                };
                self.store.replace(&replacement, true).await?;
                DryRunAction::Update
            }
            Err(e) => return Err(e),
        };

        info!(model = %definition.id, resource = %self.target, ?action, "Dry run passed");
        Ok(DryRunResult { action, manifest })
    }

    async fn delete_and_wait(&self) -> Result<(), ActivationError> {
        if self.store.delete().await? == Deletion::NotFound {
            debug!(resource = %self.target, "Resource vanished before delete");
        }

        info!(
            resource = %self.target,
            timeout = ?self.poll.timeout,
            "Waiting for InferenceService deletion"
        );

        let store = &self.store;
        let result = poll_until(self.clock.as_ref(), &self.poll, || async move {
            Ok::<bool, ActivationError>(store.get().await?.is_none())
        })
        .await;

        match result {
            Ok(attempts) => {
                debug!(resource = %self.target, attempts, "InferenceService deleted");
                Ok(())
            }
            Err(PollError::Check(e)) => Err(e),
            Err(PollError::Timeout { elapsed, attempts }) => {
                warn!(
                    resource = %self.target,
                    ?elapsed,
                    attempts,
                    "InferenceService still present after deletion wait"
                );
                Err(ActivationError::DeletionTimeout {
                    namespace: self.target.namespace.clone(),
                    name: self.target.name.clone(),
                    waited: elapsed,
                })
            }
        }
    }
}

/// Copy the live object's resourceVersion onto `manifest`
fn with_resource_version(mut manifest: Value, live: &Value) -> Value {
    let version = live
        .pointer("/metadata/resourceVersion")
        .and_then(Value::as_str);
    if let (Some(version), Some(metadata)) = (
        version,
        manifest.get_mut("metadata").and_then(Value::as_object_mut),
    ) {
        metadata.insert(
            "resourceVersion".to_string(),
            Value::String(version.to_string()),
        );
    }
    manifest
}
