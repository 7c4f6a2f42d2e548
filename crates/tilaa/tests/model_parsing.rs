//! Integration tests for parsing Tilaa API responses.
//!
//! These tests validate that the tilaa models deserialize complete response
//! bodies as returned by the API, envelope included.

use serde::Deserialize;
use std::fs;
use std::net::IpAddr;
use std::path::PathBuf;
use tilaa::models::{
    NetworkFamily, Presets, Snapshot, SnapshotStatus, StorageType, VirtualMachine,
    VirtualMachineStatus,
};
use tilaa::{SiteId, SnapshotId, TemplateId, VirtualMachineId};
use tilaa_core::{Envelope, ResponseStatus};

#[derive(Debug, Deserialize)]
struct VirtualMachineList {
    virtual_machines: Vec<VirtualMachine>,
}

#[derive(Debug, Deserialize)]
struct SnapshotList {
    snapshots: Vec<Snapshot>,
}

#[derive(Debug, Deserialize)]
struct PresetsBody {
    presets: Presets,
}

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    let fixture_path = fixtures_dir().join(name);
    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    })
}

fn load_machines() -> Vec<VirtualMachine> {
    let json_data = load_fixture("virtual_machines.json");
    let envelope: Envelope<VirtualMachineList> = serde_json::from_str(&json_data)
        .unwrap_or_else(|e| panic!("Failed to deserialize VM list: {e}\nJSON: {json_data}"));
    assert_eq!(envelope.status, ResponseStatus::Ok);
    envelope.into_result().unwrap().virtual_machines
}

#[test]
fn test_deserialize_vm_list() {
    let machines = load_machines();
    assert_eq!(machines.len(), 2, "Expected 2 VMs in test data");
}

#[test]
fn test_running_vm_fields() {
    let machines = load_machines();
    let vm = machines
        .iter()
        .find(|vm| vm.id == Some(VirtualMachineId::new(12)))
        .expect("Should have VM 12");

    assert_eq!(vm.name, "web-01");
    assert_eq!(vm.cpu.cores, 2);
    assert_eq!(vm.cpu.cap, 100);
    assert_eq!(vm.ram, 2048);
    assert_eq!(vm.storage.size, 40);
    assert_eq!(vm.storage.kind, StorageType::Ssd);
    assert_eq!(vm.site.as_ref().map(|s| s.id), Some(SiteId::new(1)));
    assert_eq!(vm.template.as_ref().map(|t| t.id), Some(TemplateId::new(7)));
    assert!(vm.managed);
    assert!(!vm.locked);
    assert_eq!(vm.status, VirtualMachineStatus::Running);
    assert!(vm.cancelled.is_none());
    assert_eq!(vm.admin.account, "root");

    // Network entries
    assert_eq!(vm.network.len(), 2);
    assert_eq!(vm.network[0].family, NetworkFamily::Ipv4);
    assert_eq!(
        vm.network[0].address,
        Some("203.0.113.10".parse::<IpAddr>().unwrap())
    );
    assert_eq!(vm.network[1].family, NetworkFamily::Ipv6);
    assert!(vm.network[1].address.is_some_and(|ip| ip.is_ipv6()));
}

#[test]
fn test_unknown_status_and_cancellation() {
    let machines = load_machines();
    let vm = machines
        .iter()
        .find(|vm| vm.id == Some(VirtualMachineId::new(13)))
        .expect("Should have VM 13");

    assert_eq!(vm.status, VirtualMachineStatus::Unknown);
    assert!(!vm.status.is_failed());
    assert_eq!(vm.storage.kind, StorageType::Hdd);
    assert!(vm.network.is_empty());
    assert!(vm.locked);
    assert_eq!(
        vm.cancelled.map(|c| c.to_rfc3339()),
        Some("2030-01-31T00:00:00+00:00".to_string())
    );
}

#[test]
fn test_decoded_vm_has_no_pending_changes() {
    for vm in load_machines() {
        assert!(!vm.has_pending_changes());
    }
}

#[test]
fn test_admin_password_not_in_debug_output() {
    let machines = load_machines();
    let debug = format!("{:?}", machines[0]);
    assert!(!debug.contains("Xk29!vq"));
}

#[test]
fn test_deserialize_snapshots() {
    let json_data = load_fixture("snapshots.json");
    let envelope: Envelope<SnapshotList> = serde_json::from_str(&json_data).unwrap();
    let snapshots = envelope.into_result().unwrap().snapshots;

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].id, Some(SnapshotId::new(5)));
    assert_eq!(snapshots[0].status, SnapshotStatus::Success);
    assert_eq!(snapshots[0].storage, 40);
    assert_eq!(snapshots[1].status, SnapshotStatus::Unknown);
    assert_eq!(
        snapshots[1].template.as_ref().map(|t| t.name.as_str()),
        Some("Ubuntu 24.04")
    );
    assert!(snapshots[0].created < snapshots[1].created);
}

#[test]
fn test_presets_validate_machines() {
    let json_data = load_fixture("presets.json");
    let envelope: Envelope<PresetsBody> = serde_json::from_str(&json_data).unwrap();
    let presets = envelope.into_result().unwrap().presets;

    assert_eq!(presets.ram.sizes.len(), 5);
    assert_eq!(presets.storage_sizes(StorageType::Hdd), &[100, 200, 400]);

    let machines = load_machines();
    assert!(presets.check_machine(&machines[0]).is_ok());
    assert!(presets.check_machine(&machines[1]).is_ok());

    let oversized = VirtualMachine::new("big", SiteId::new(1), TemplateId::new(7))
        .with_ram(3000)
        .with_storage(40, StorageType::Ssd);
    assert!(presets.check_machine(&oversized).is_err());
}
