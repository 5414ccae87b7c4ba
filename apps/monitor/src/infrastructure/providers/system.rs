use super::traits::{ResourceSample, ResourceSampler};
use crate::domain::errors::{MonitoringError, MonitoringResult};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use sysinfo::{Disks, Networks, Pid, System};

const BYTES_TO_MB: f64 = 1024.0 * 1024.0;
const SOURCE_NAME: &str = "sysinfo";

struct SamplerState {
    system: System,
    networks: Networks,
    disks: Disks,
    pid: Option<Pid>,
}

/// Resource sampler backed by the `sysinfo` crate.
///
/// CPU usage is computed between consecutive refreshes, so the very first
/// sample reports 0%. Disk usage is summed over every mounted disk. Socket counts are not exposed by sysinfo and are
/// always reported as zero.
pub struct SysinfoResourceSampler {
    state: Arc<Mutex<SamplerState>>,
}

impl SysinfoResourceSampler {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu();
        system.refresh_memory();

        Self {
            state: Arc::new(Mutex::new(SamplerState {
                system,
                networks: Networks::new_with_refreshed_list(),
                disks: Disks::new_with_refreshed_list(),
                pid: sysinfo::get_current_pid().ok(),
            })),
        }
    }
}

impl Default for SysinfoResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceSampler for SysinfoResourceSampler {
    async fn sample(&self) -> MonitoringResult<ResourceSample> {
        let state = Arc::clone(&self.state);

        tokio::task::spawn_blocking(move || {
            let mut guard = state
                .lock()
                .map_err(|_| MonitoringError::transient(SOURCE_NAME, "sampler state poisoned"))?;
            let SamplerState { system, networks, disks, pid } = &mut *guard;

            system.refresh_cpu();
            system.refresh_memory();
            networks.refresh();
            disks.refresh();

            let total_memory = system.total_memory() as f64;
            let memory_percent = if total_memory > 0.0 {
                system.used_memory() as f64 / total_memory * 100.0
            } else {
                0.0
            };

            let (disk_total, disk_available) = disks
                .iter()
                .fold((0u64, 0u64), |(total, available), disk| {
                    (total + disk.total_space(), available + disk.available_space())
                });
            let disk_percent = if disk_total > 0 {
                disk_total.saturating_sub(disk_available) as f64 / disk_total as f64 * 100.0
            } else {
                0.0
            };

            let (disk_io_read_mb, disk_io_write_mb) = match *pid {
                Some(pid) if system.refresh_process(pid) => system
                    .process(pid)
                    .map(|process| {
                        let usage = process.disk_usage();
                        (usage.read_bytes as f64 / BYTES_TO_MB, usage.written_bytes as f64 / BYTES_TO_MB)
                    })
                    .unwrap_or_default(),
                _ => (0.0, 0.0),
            };

            let (network_bytes_sent, network_bytes_recv) = networks
                .iter()
                .fold((0u64, 0u64), |(sent, recv), (_, data)| {
                    (sent + data.total_transmitted(), recv + data.total_received())
                });

            Ok(ResourceSample {
                cpu_percent: system.global_cpu_info().cpu_usage() as f64,
                memory_percent,
                memory_available_mb: system.available_memory() as f64 / BYTES_TO_MB,
                disk_percent,
                disk_io_read_mb,
                disk_io_write_mb,
                network_bytes_sent,
                network_bytes_recv,
                active_connections: 0,
            })
        })
        .await
        .map_err(|e| MonitoringError::transient(SOURCE_NAME, format!("sampling task failed: {}", e)))?
    }
}
