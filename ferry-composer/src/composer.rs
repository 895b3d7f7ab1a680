//! Descriptor composition
//!
//! Runs every composition step in order over one manifest. Parameters are
//! resolved before anything else is built, so a missing key or a denied read
//! aborts with no identity, source binding or build spec created.

use ferry_core::Result;
use ferry_core::domain::application::{ApplicationDescriptor, ApplicationOutputs};
use ferry_core::domain::build::LayoutProbe;
use ferry_core::domain::manifest::DescriptorManifest;
use ferry_core::domain::parameter::ParameterStore;
use ferry_core::domain::target::DeploymentTarget;
use std::sync::Arc;
use tracing::info;

use crate::build::build_spec;
use crate::environment::inject_environment;
use crate::identity::bind_identity;
use crate::outputs::export_outputs;
use crate::release::build_topology;
use crate::resolver::ParameterResolver;
use crate::source::bind_source;

/// Composes application descriptors for one deployment target
#[derive(Clone)]
pub struct Composer {
    store: Arc<dyn ParameterStore>,
    probe: Arc<dyn LayoutProbe>,
    target: DeploymentTarget,
}

impl Composer {
    /// Create a composer
    ///
    /// # Arguments
    /// * `store` - Where parameter values are read from
    /// * `probe` - Source layout used for working-directory discovery
    /// * `target` - Partition, region and account the descriptor is for
    pub fn new(
        store: Arc<dyn ParameterStore>,
        probe: Arc<dyn LayoutProbe>,
        target: DeploymentTarget,
    ) -> Self {
        Self {
            store,
            probe,
            target,
        }
    }

    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    /// Compose a descriptor from a manifest
    ///
    /// # Errors
    /// Any `DescriptorError` raised by a step; nothing is returned partially.
    pub async fn compose(&self, manifest: &DescriptorManifest) -> Result<ApplicationDescriptor> {
        info!("Composing descriptor {}", manifest.name);

        self.target.validate()?;
        manifest.validate()?;

        let keys = manifest.parameter_keys();
        let resolved = ParameterResolver::new(self.store.as_ref())
            .resolve_all(&keys)
            .await?;

        let identity = bind_identity(&manifest.identity, &keys, &manifest.source.token, &self.target)?;
        let source = bind_source(&manifest.source);
        let build_spec = build_spec(&manifest.build, self.probe.as_ref())?;
        let environment = inject_environment(manifest, &resolved)?;
        let topology = build_topology(
            &manifest.branches,
            &build_spec,
            &environment,
            manifest.auto_branch_deletion,
        );

        info!(
            "Composed {} with {} release environment(s)",
            manifest.name,
            topology.environments.len()
        );

        Ok(ApplicationDescriptor {
            name: manifest.name.clone(),
            description: manifest.description.clone(),
            platform: manifest.platform,
            target: self.target.clone(),
            identity,
            source,
            build_spec,
            environment,
            topology,
            resolved,
        })
    }

    /// Compose a descriptor and export its outputs
    pub async fn compose_with_outputs(
        &self,
        manifest: &DescriptorManifest,
    ) -> Result<(ApplicationDescriptor, ApplicationOutputs)> {
        let descriptor = self.compose(manifest).await?;
        let outputs = export_outputs(&descriptor);
        info!("Application id {} at {}", outputs.app_id, outputs.default_domain);
        Ok((descriptor, outputs))
    }
}
