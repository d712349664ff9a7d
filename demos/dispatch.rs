use dfs_dispatch::{DfsBackend, DfsDispatcher, MapBackend, RegistryConfig, StaticFactory, utils};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
policy = "prefix"
default_backend = "local"

[[path_backends]]
prefix = "var/storage/images/"
backend = "images"
"#;

fn main() -> dfs_dispatch::Result<()> {
    // RUST_LOG=debug shows every resolution and bridging decision
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let images = utils::handle(MapBackend::new());
    let local = utils::handle(MapBackend::new());
    let factory = StaticFactory::new()
        .with("images", images.clone())
        .with("local", local.clone());

    let dispatcher = DfsDispatcher::from_config(&RegistryConfig::from_toml_str(CONFIG)?, factory)?;

    // both files land on the default backend
    dispatcher.write("var/cache/logo.png", b"Hello")?;
    dispatcher.write("var/cache/banner.png", b"World")?;

    // crosses from `local` to `images`: read, then write
    dispatcher.copy_between_managed_storage("var/cache/logo.png", "var/storage/images/logo.png")?;

    // crosses too: read, write, then delete the source
    dispatcher.rename("var/cache/banner.png", "var/storage/images/banner.png")?;

    let mut greeting = Vec::new();
    dispatcher.stream("var/storage/images/logo.png", 0, None, &mut greeting)?;
    greeting.extend_from_slice(b", ");
    dispatcher.stream("var/storage/images/banner.png", 0, Some(5), &mut greeting)?;
    println!("{}!", String::from_utf8_lossy(&greeting));

    println!("images backend: {} file(s)", images.list_files("")?.count());
    for path in dispatcher.list_files("var/")? {
        println!("  {}", path?);
    }

    // one call per backend
    dispatcher.delete(&[
        "var/cache/logo.png",
        "var/storage/images/logo.png",
        "var/storage/images/banner.png",
    ])?;
    assert_eq!(local.list_files("")?.count(), 0);

    Ok(())
}
