use tracing::debug;

use super::report::RunReport;
use super::{ReconcileError, Reconciler, Stage, StepCounter};
use crate::config::schema::Document;
use crate::executor::OperationRequest;

impl Reconciler {
    /// Removes what `document` lists, children before parents, stopping at
    /// the first failed operation.
    ///
    /// Every listed endpoint is deleted. A network is deleted only when the
    /// document gives it no endpoints, and a tenant only when the document
    /// gives it no networks. A document naming a network together with its
    /// endpoints therefore removes the endpoints and keeps the network.
    pub async fn remove(
        &self,
        document: &Document,
        report: &mut RunReport,
    ) -> Result<(), ReconcileError> {
        let mut steps = StepCounter::new(Stage::Destructive);

        for tenant in &document.tenants {
            for network in &tenant.networks {
                for endpoint in &network.endpoints {
                    let request = OperationRequest::delete_endpoint(network, endpoint);
                    self.execute_step(&mut steps, request, report).await?;
                }

                if network.has_endpoints() {
                    debug!(network = %network.name, "Network lists endpoints, keeping it");
                } else {
                    let request = OperationRequest::delete_network(tenant, network);
                    self.execute_step(&mut steps, request, report).await?;
                }
            }

            if tenant.has_networks() {
                debug!(tenant = %tenant.name, "Tenant lists networks, keeping it");
            } else {
                self.execute_step(&mut steps, OperationRequest::delete_tenant(tenant), report)
                    .await?;
            }
        }

        Ok(())
    }
}
