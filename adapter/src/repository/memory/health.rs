use async_trait::async_trait;
use kernel::repository::health::HealthCheckRepository;

#[derive(Default)]
pub struct HealthCheckRepositoryMemory;

#[async_trait]
impl HealthCheckRepository for HealthCheckRepositoryMemory {
    async fn check_db(&self) -> bool {
        true
    }
}
