//! Machine and task endpoints (arduino consumer API).
//!
//! Machines and their current tasks live in separate collections on the
//! backend; [`ApiClient::fetch_machines`] fetches both in parallel and joins
//! them by IP. Mutations are fire-and-forget notifications: the dashboard
//! applies state locally first and never rolls back on remote failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use buildshift_core::error::Result;
use buildshift_core::types::{Machine, Task};
use buildshift_data::lifecycle::{self, TaskUpdate};

use crate::client::ApiClient;

pub const GET_MACHINES: &str = "/api/arduino_consumer/arduino/get-machines/";
pub const GET_TASKS: &str = "/api/arduino_consumer/arduino/get-tasks/";
pub const ADD_MACHINE: &str = "/api/arduino_consumer/arduino/add-machine/";
pub const REMOVE_MACHINE: &str = "/api/arduino_consumer/arduino/remove-machine/";
pub const TASK_UPDATE: &str = "/api/arduino_consumer/arduino/task-update/";

/// One row of the tasks collection, keyed by machine IP.
#[derive(Debug, Clone, Deserialize)]
struct TaskRecord {
    ip: String,
    #[serde(flatten)]
    task: Task,
}

/// Payload for add/edit machine.
#[derive(Debug, Serialize)]
struct MachinePayload<'a> {
    alias: &'a str,
    ip: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    wakeup_payload: Option<&'a Value>,
}

impl ApiClient {
    /// Fetch machines and tasks in parallel, joining tasks onto machines
    /// by IP. Machines without a matching task report idle.
    pub async fn fetch_machines(&self) -> Result<Vec<Machine>> {
        let (mut machines, tasks) = tokio::try_join!(
            self.get_json::<Vec<Machine>>(GET_MACHINES, &[]),
            self.get_json::<Vec<TaskRecord>>(GET_TASKS, &[]),
        )?;

        for machine in &mut machines {
            machine.task = tasks
                .iter()
                .find(|t| t.ip == machine.ip)
                .map(|t| t.task.clone());
        }

        Ok(machines)
    }

    /// Register a new machine, or re-post an edited one.
    ///
    /// The backend upserts by IP, so edits go through the same endpoint.
    pub async fn add_machine(&self, machine: &Machine) -> Result<()> {
        lifecycle::validate_machine(machine)?;
        self.post_json(
            ADD_MACHINE,
            &[],
            &MachinePayload {
                alias: &machine.alias,
                ip: &machine.ip,
                wakeup_payload: machine.wakeup_payload.as_ref(),
            },
        )
        .await?;
        Ok(())
    }

    /// Remove a machine by IP.
    ///
    /// The idle-only guard is enforced by the caller via
    /// [`lifecycle::ensure_removable`] before any local or remote mutation.
    pub async fn remove_machine(&self, ip: &str) -> Result<()> {
        self.post_json(REMOVE_MACHINE, &[], &serde_json::json!({ "ip": ip }))
            .await?;
        Ok(())
    }

    /// Mirror a task transition to the backend.
    pub async fn send_task_update(&self, update: &TaskUpdate) -> Result<()> {
        self.post_json(TASK_UPDATE, &[], update).await?;
        Ok(())
    }

    /// Persist an edited wakeup payload by re-posting the machine.
    pub async fn update_wakeup_payload(&self, machine: &Machine, payload: &Value) -> Result<()> {
        lifecycle::validate_machine(machine)?;
        self.post_json(
            ADD_MACHINE,
            &[],
            &MachinePayload {
                alias: &machine.alias,
                ip: &machine.ip,
                wakeup_payload: Some(payload),
            },
        )
        .await?;
        Ok(())
    }

    /// Refetch a single machine by IP.
    pub async fn fetch_machine(&self, ip: &str) -> Result<Option<Machine>> {
        let machines = self.fetch_machines().await?;
        Ok(machines.into_iter().find(|m| m.ip == ip))
    }
}
