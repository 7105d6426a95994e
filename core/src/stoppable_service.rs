/// long running service of the generator, running next to the scheduler
#[async_trait::async_trait]
pub trait StoppableService {
    /// request the service to stop and wait for its termination
    async fn stop(self) -> anyhow::Result<()>;
}
