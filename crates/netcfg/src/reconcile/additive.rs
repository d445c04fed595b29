use tracing::debug;

use super::report::{EntityRef, RunReport};
use super::{ReconcileError, Reconciler, Stage, StepCounter};
use crate::config::schema::Document;
use crate::executor::OperationRequest;
use crate::store::EntityKind;

impl Reconciler {
    /// Creates every tenant, network and endpoint of `document`, parents
    /// before children, stopping at the first failed operation.
    ///
    /// With `idempotent` set, a tenant that has at least one network is
    /// looked up first and left alone if already stored, and the same goes
    /// for each of its networks as long as the stored record names the same
    /// tenant. A network stored under another tenant is created again, which
    /// rewrites its owner. Endpoints are always created.
    pub async fn apply(
        &self,
        document: &Document,
        idempotent: bool,
        report: &mut RunReport,
    ) -> Result<(), ReconcileError> {
        let mut steps = StepCounter::new(Stage::Additive);

        for tenant in &document.tenants {
            let check = idempotent && tenant.has_networks();

            if check && self.exists(EntityKind::Tenant, &tenant.name).await? {
                debug!(tenant = %tenant.name, "Tenant already stored, skipping");
                report
                    .skipped
                    .push(EntityRef::new(EntityKind::Tenant, &tenant.name));
            } else {
                self.execute_step(&mut steps, OperationRequest::create_tenant(tenant), report)
                    .await?;
            }

            for network in &tenant.networks {
                if check && self.network_in_place(&tenant.name, &network.name).await? {
                    debug!(network = %network.name, "Network already stored, skipping");
                    report
                        .skipped
                        .push(EntityRef::new(EntityKind::Network, &network.name));
                } else {
                    let request = OperationRequest::create_network(tenant, network);
                    self.execute_step(&mut steps, request, report).await?;
                }

                for endpoint in &network.endpoints {
                    let request = OperationRequest::create_endpoint(network, endpoint);
                    self.execute_step(&mut steps, request, report).await?;
                }
            }
        }

        Ok(())
    }
}
