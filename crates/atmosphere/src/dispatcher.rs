//! Bounded worker pool running every inbound operation as a [`Task`].
//!
//! A task is spawned onto the runtime and waits there for a pool permit.
//! The caller waits at most `task_timeout` for it to finish; a task that
//! overruns is aborted. Once the dispatcher is shut down new work is
//! refused and waiting callers are released with `Cancelled`.

use std::any::Any;
use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tokio::sync::{watch, Semaphore};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use weather_common::{AirportRecord, WeatherError, WeatherResult};

use crate::frequency::HealthSnapshot;
use crate::ledger::TaskLedger;
use crate::observation::ObservationPoint;
use crate::record::AtmosphericRecord;
use crate::service::AtmosphereService;
use crate::task::{Task, TaskOutput};

/// Pool size and wait bound.
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    pub pool_size: usize,
    pub task_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            pool_size: 100,
            task_timeout: Duration::from_secs(30),
        }
    }
}

pub struct TaskDispatcher {
    service: Arc<AtmosphereService>,
    permits: Arc<Semaphore>,
    task_timeout: Duration,
    ledger: Arc<TaskLedger>,
    shutdown: watch::Sender<bool>,
}

impl TaskDispatcher {
    pub fn new(service: Arc<AtmosphereService>, config: DispatcherConfig) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            service,
            permits: Arc::new(Semaphore::new(config.pool_size.max(1))),
            task_timeout: config.task_timeout,
            ledger: Arc::new(TaskLedger::new()),
            shutdown,
        }
    }

    pub fn service(&self) -> &Arc<AtmosphereService> {
        &self.service
    }

    pub fn ledger(&self) -> &TaskLedger {
        &self.ledger
    }

    /// Permits not currently held by a running task.
    pub fn available_workers(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run one task and wait for its output.
    pub async fn dispatch(&self, task: Task) -> WeatherResult<TaskOutput> {
        let operation = task.operation();
        let service = self.service.clone();
        self.run(operation, async move { task.execute(&service).await })
            .await
    }

    pub(crate) async fn run<F, T>(&self, operation: &'static str, work: F) -> WeatherResult<T>
    where
        F: Future<Output = WeatherResult<T>> + Send + 'static,
        T: Send + 'static,
    {
        if self.is_shut_down() {
            counter!("weather_tasks_total", "operation" => operation, "outcome" => "rejected")
                .increment(1);
            return Err(WeatherError::Cancelled);
        }

        let id = Uuid::new_v4().to_string();
        let start = Instant::now();
        self.ledger.submit(&id, operation).await;

        let permits = self.permits.clone();
        let ledger = self.ledger.clone();
        let task_id = id.clone();
        let mut handle = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|_| WeatherError::Cancelled)?;
            ledger.mark_running(&task_id).await;
            work.await
        });

        let abort = handle.abort_handle();
        let mut shutdown = self.shutdown.subscribe();
        let result = tokio::select! {
            joined = tokio::time::timeout(self.task_timeout, &mut handle) => match joined {
                Ok(Ok(result)) => result,
                Ok(Err(e)) if e.is_panic() => {
                    let message = panic_message(e.into_panic());
                    error!(task_id = %id, operation, panic = %message, "Task panicked");
                    Err(WeatherError::TaskFailed(message))
                }
                Ok(Err(e)) => Err(WeatherError::TaskFailed(e.to_string())),
                Err(_) => {
                    abort.abort();
                    warn!(
                        task_id = %id,
                        operation,
                        timeout_ms = self.task_timeout.as_millis() as u64,
                        "Task timed out"
                    );
                    Err(WeatherError::TaskTimeout(self.task_timeout.as_millis() as u64))
                }
            },
            _ = wait_for_shutdown(&mut shutdown) => {
                abort.abort();
                Err(WeatherError::Cancelled)
            }
        };

        let elapsed = start.elapsed();
        let (outcome, failure) = match &result {
            Ok(_) => ("ok", None),
            Err(e) if is_task_failure(e) => ("failed", Some(e.to_string())),
            // The task ran to completion and produced a domain error.
            Err(_) => ("error", None),
        };

        self.ledger.finish(&id, failure).await;
        counter!("weather_tasks_total", "operation" => operation, "outcome" => outcome)
            .increment(1);
        histogram!("weather_task_duration_seconds", "operation" => operation)
            .record(elapsed.as_secs_f64());
        debug!(
            task_id = %id,
            operation,
            outcome,
            duration_ms = elapsed.as_millis() as u64,
            "Task finished"
        );

        result
    }

    /// Refuse new work and release every waiting caller.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            self.permits.close();
            info!("Task dispatcher shut down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Resolves once [`shutdown`](Self::shutdown) has been called.
    pub fn shutdown_signal(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.shutdown.subscribe();
        async move {
            wait_for_shutdown(&mut rx).await;
        }
    }

    pub async fn ping(&self) -> WeatherResult<HealthSnapshot> {
        match self.dispatch(Task::HealthCheck).await? {
            TaskOutput::Health(snapshot) => Ok(snapshot),
            other => Err(unexpected(other)),
        }
    }

    pub async fn weather(
        &self,
        iata: &str,
        radius: Option<&str>,
    ) -> WeatherResult<Vec<AtmosphericRecord>> {
        let task = Task::QueryWeather {
            iata: iata.to_string(),
            radius: radius.map(str::to_string),
        };
        match self.dispatch(task).await? {
            TaskOutput::Weather(records) => Ok(records),
            other => Err(unexpected(other)),
        }
    }

    pub async fn update_weather(
        &self,
        iata: &str,
        point_type: &str,
        point: ObservationPoint,
    ) -> WeatherResult<()> {
        let task = Task::UpdateWeather {
            iata: iata.to_string(),
            point_type: point_type.to_string(),
            point,
        };
        match self.dispatch(task).await? {
            TaskOutput::Updated => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    pub async fn list_airport_codes(&self) -> WeatherResult<BTreeSet<String>> {
        match self.dispatch(Task::ListAirports).await? {
            TaskOutput::Codes(codes) => Ok(codes),
            other => Err(unexpected(other)),
        }
    }

    pub async fn get_airport(&self, iata: &str) -> WeatherResult<Option<AirportRecord>> {
        let task = Task::GetAirport {
            iata: iata.to_string(),
        };
        match self.dispatch(task).await? {
            TaskOutput::MaybeAirport(airport) => Ok(airport),
            other => Err(unexpected(other)),
        }
    }

    pub async fn add_airport(
        &self,
        iata: &str,
        latitude: &str,
        longitude: &str,
    ) -> WeatherResult<AirportRecord> {
        let task = Task::AddAirport {
            iata: iata.to_string(),
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        };
        match self.dispatch(task).await? {
            TaskOutput::Airport(airport) => Ok(airport),
            other => Err(unexpected(other)),
        }
    }

    pub async fn delete_airport(&self, iata: &str) -> WeatherResult<AirportRecord> {
        let task = Task::RemoveAirport {
            iata: iata.to_string(),
        };
        match self.dispatch(task).await? {
            TaskOutput::Airport(airport) => Ok(airport),
            other => Err(unexpected(other)),
        }
    }

    pub async fn reset(&self) -> WeatherResult<usize> {
        match self.dispatch(Task::Reset).await? {
            TaskOutput::Reset { airports } => Ok(airports),
            other => Err(unexpected(other)),
        }
    }
}

async fn wait_for_shutdown(rx: &mut watch::Receiver<bool>) {
    // Err means the sender is gone, which only happens on drop.
    let _ = rx.wait_for(|stop| *stop).await;
}

fn is_task_failure(err: &WeatherError) -> bool {
    matches!(
        err,
        WeatherError::TaskFailed(_) | WeatherError::TaskTimeout(_) | WeatherError::Cancelled
    )
}

fn unexpected(output: TaskOutput) -> WeatherError {
    WeatherError::Internal(format!("unexpected task output: {:?}", output))
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
