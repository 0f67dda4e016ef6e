//! The aggregate result report written on termination.

use septa::phone::PhoneDirectory;
use septa::Policy;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `<PolicyName>_results.txt` into `dir`: the policy name, the total
/// searches (all phones' reads) and the total updates (all phones' writes).
/// Returns the path of the written file.
pub fn write_report(
    dir: &Path,
    policy: Policy,
    phones: &PhoneDirectory,
) -> std::io::Result<PathBuf> {
    let path = dir.join(format!("{}_results.txt", policy));
    let mut file = File::create(&path)?;
    writeln!(file, "{}", policy)?;
    writeln!(file, "Number of searches: {}", phones.total_reads())?;
    writeln!(file, "Number of updates:  {}", phones.total_writes())?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexgrid::Point;
    use std::fs;

    #[test]
    fn report_has_the_exact_three_lines() {
        let dir = std::env::temp_dir().join(format!("sim_septa_report_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut phones = PhoneDirectory::new();
        phones.add("a", Point::new(0.0, 0.0)).unwrap();

        let path = write_report(&dir, Policy::BasicPointer, &phones).unwrap();
        assert!(path.ends_with("BasicPointerLocationManager_results.txt"));
        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "BasicPointerLocationManager\nNumber of searches: 0\nNumber of updates:  0\n"
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn every_policy_names_its_own_file() {
        let dir = std::env::temp_dir().join(format!("sim_septa_names_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let phones = PhoneDirectory::new();

        for (policy, expected) in &[
            (Policy::BasicPointer, "BasicPointerLocationManager_results.txt"),
            (Policy::BasicValue, "BasicValueLocationManager_results.txt"),
            (Policy::Replication, "ReplicationLocationManager_results.txt"),
            (
                Policy::ForwardingPointer,
                "ForwardingPointerLocationManager_results.txt",
            ),
        ] {
            let path = write_report(&dir, *policy, &phones).unwrap();
            assert!(path.ends_with(expected), "{:?}", path);
        }
        fs::remove_dir_all(&dir).ok();
    }
}
