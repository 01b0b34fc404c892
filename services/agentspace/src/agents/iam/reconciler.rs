//! IAM Reconciler
//!
//! Computes which required service-agent bindings are absent from a
//! project's IAM policy and applies only those.
//!
//! Every check and every mutation starts from a freshly fetched policy.
//! There is no compare-and-swap: two processes reconciling the same project
//! at once can overwrite each other's changes (last write wins).

use tracing::{debug, error, info, warn};

use super::client::PolicyClient;
use super::types::{
    service_account_email, service_account_member, IamError, PermissionRequirement,
    PermissionStatus, Policy, ReconciliationResult, RoleBinding, VerificationReport,
};

/// True iff `member` holds exactly `role` in `policy`, with no condition attached
pub fn has_binding(policy: &Policy, member: &str, role: &str) -> bool {
    policy.has_binding(member, role)
}

/// Reconciles service-agent role bindings on one project
pub struct IamReconciler<C: PolicyClient> {
    client: C,
    project_id: String,
    project_number: String,
}

impl<C: PolicyClient> IamReconciler<C> {
    pub fn new(client: C, project_id: &str, project_number: &str) -> Self {
        Self {
            client,
            project_id: project_id.to_string(),
            project_number: project_number.to_string(),
        }
    }

    /// Resource name the policy lives on
    pub fn resource(&self) -> String {
        format!("projects/{}", self.project_id)
    }

    pub fn service_account_email(&self, service: &str) -> String {
        service_account_email(service, &self.project_number)
    }

    pub fn service_account_member(&self, service: &str) -> String {
        service_account_member(&self.service_account_email(service))
    }

    /// Concrete bindings for a requirement, one per role, in role order
    pub fn role_bindings(&self, requirement: &PermissionRequirement) -> Vec<RoleBinding> {
        requirement
            .roles
            .iter()
            .map(|role| RoleBinding::new(&requirement.service, &self.project_number, role))
            .collect()
    }

    /// Current policy snapshot; never cached
    pub async fn fetch_policy(&self) -> Result<Policy, IamError> {
        self.client.get_policy(&self.resource()).await
    }

    /// Fresh fetch followed by [`has_binding`]
    pub async fn check_binding(&self, member: &str, role: &str) -> Result<bool, IamError> {
        let policy = self.fetch_policy().await?;
        Ok(has_binding(&policy, member, role))
    }

    /// Grant `role` to `member`.
    ///
    /// Returns `Ok(false)` when the binding already exists. Under `dry_run`
    /// the same presence check runs but nothing is written.
    pub async fn add_binding(&self, member: &str, role: &str, dry_run: bool) -> Result<bool, IamError> {
        let mut policy = self.fetch_policy().await?;

        if !policy.grant(member, role) {
            debug!(member = %member, role = %role, "Binding already present");
            return Ok(false);
        }

        if dry_run {
            info!(member = %member, role = %role, "DRY RUN - would add binding");
            return Ok(true);
        }

        self.client.set_policy(&self.resource(), &policy).await?;
        info!(member = %member, role = %role, "Binding added");
        Ok(true)
    }

    /// Revoke `role` from `member`.
    ///
    /// Returns `Ok(false)` when the binding was not present.
    pub async fn remove_binding(&self, member: &str, role: &str, dry_run: bool) -> Result<bool, IamError> {
        let mut policy = self.fetch_policy().await?;

        if !policy.revoke(member, role) {
            debug!(member = %member, role = %role, "Binding not present, nothing to remove");
            return Ok(false);
        }

        if dry_run {
            info!(member = %member, role = %role, "DRY RUN - would remove binding");
            return Ok(true);
        }

        self.client.set_policy(&self.resource(), &policy).await?;
        warn!(member = %member, role = %role, "Binding removed");
        Ok(true)
    }

    /// Apply every missing binding in `requirements`.
    ///
    /// A failure on one binding is recorded in `failed` and processing moves
    /// on to the next one.
    pub async fn reconcile(
        &self,
        requirements: &[PermissionRequirement],
        dry_run: bool,
        verbose: bool,
    ) -> ReconciliationResult {
        let mut result = ReconciliationResult::default();

        info!(
            project = %self.project_id,
            requirements = requirements.len(),
            dry_run,
            "Starting IAM reconciliation"
        );

        for requirement in requirements {
            if verbose {
                info!(
                    service = %requirement.display_name,
                    account = %self.service_account_email(&requirement.service),
                    purpose = %requirement.purpose,
                    "Checking service agent"
                );
            }

            for binding in self.role_bindings(requirement) {
                let role = &binding.role;
                let label = requirement.label(role);

                match self.reconcile_one(&binding, dry_run).await {
                    Ok(BindingOutcome::Present) => {
                        if verbose {
                            info!(role = %role, "Already exists");
                        }
                        result.existing.push(label);
                    }
                    Ok(BindingOutcome::Added) => {
                        info!(role = %role, dry_run, "Binding added");
                        result.added.push(label);
                    }
                    Err(e) => {
                        error!(role = %role, error = %e, "Failed to reconcile binding");
                        result.failed.push(format!("{}: {}", label, e));
                    }
                }
            }
        }

        info!(
            added = result.added.len(),
            existing = result.existing.len(),
            failed = result.failed.len(),
            "IAM reconciliation complete"
        );

        result
    }

    async fn reconcile_one(&self, binding: &RoleBinding, dry_run: bool) -> Result<BindingOutcome, IamError> {
        let member = binding.member();
        if self.check_binding(&member, &binding.role).await? {
            return Ok(BindingOutcome::Present);
        }

        // Re-fetches inside; the binding may have appeared since the check
        if self.add_binding(&member, &binding.role, dry_run).await? {
            Ok(BindingOutcome::Added)
        } else {
            Ok(BindingOutcome::Present)
        }
    }

    /// Report which required bindings exist, without changing anything
    pub async fn verify(&self, requirements: &[PermissionRequirement]) -> Result<VerificationReport, IamError> {
        let mut report = VerificationReport::default();

        for requirement in requirements {
            for binding in self.role_bindings(requirement) {
                let granted = self.check_binding(&binding.member(), &binding.role).await?;
                report.entries.push(PermissionStatus {
                    label: requirement.label(&binding.role),
                    granted,
                });
            }
        }

        debug!(
            checked = report.entries.len(),
            all_granted = report.all_granted(),
            "IAM verification complete"
        );
        Ok(report)
    }

    /// Roles held by a service agent, sorted
    pub async fn list_roles_for_service(&self, service: &str) -> Result<Vec<String>, IamError> {
        let member = self.service_account_member(service);
        let policy = self.fetch_policy().await?;
        Ok(policy.roles_for(&member))
    }
}

enum BindingOutcome {
    Present,
    Added,
}
