//! Prints the ConfigMapManager CustomResourceDefinition as YAML.
//!
//! ```sh
//! cargo run -p crds --bin crdgen > deploy/crd.yaml
//! ```

use crds::ConfigMapManager;
use kube::CustomResourceExt;

fn main() -> anyhow::Result<()> {
    let crd = ConfigMapManager::crd();
    print!("{}", serde_yaml::to_string(&crd)?);
    Ok(())
}
