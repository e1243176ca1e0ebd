use std::sync::Arc;

use asset_kit::{
    AssetProvider, AssetServer, CancellationToken, DirProvider, MapProvider, NamespacedServer,
    TextServer,
};
use tracing_subscriber::EnvFilter;

fn print_server<T: Send + 'static>(server: &dyn AssetProvider<T>, name: &str) {
    let title = format!("# {name} #");
    let border = "#".repeat(title.len());
    println!("{border}\n{title}\n{border}\n");

    println!("- available_assets():");
    for asset in server.available_assets().unwrap() {
        println!("    {asset}");
    }
    println!();
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let tmp = std::env::temp_dir().join("asset_kit_demo");
    std::fs::create_dir_all(tmp.join("Texts")).unwrap();
    std::fs::write(tmp.join("Texts/sample-text.txt"), b"Hello from disk").unwrap();
    std::fs::write(tmp.join("asset.json"), br#"{"server_name": "demo"}"#).unwrap();

    // the directory names its own scheme in `asset.json`
    let disk = Arc::new(DirProvider::open(&tmp).unwrap());

    // in-memory assets of the same scheme; registered first, so they win on conflicts
    let memory: MapProvider = MapProvider::new("demo").unwrap();
    memory
        .insert("Texts/greeting.json", br#"{"text": "Hello from memory"}"#.to_vec())
        .unwrap();
    let memory = Arc::new(memory);

    let bytes = Arc::new(AssetServer::<Vec<u8>>::new().with_extension("json").with_extension("txt"));
    bytes.add_provider(memory.clone());
    bytes.add_provider(disk.clone());

    let texts = NamespacedServer::<Vec<u8>>::new(bytes.clone(), "Texts").unwrap();
    let strings = TextServer::new(bytes.clone());

    print_server::<Vec<u8>>(bytes.as_ref(), "Global Asset Server");
    print_server::<Vec<u8>>(disk.as_ref(), "Directory Provider");
    print_server::<Vec<u8>>(&texts, "Namespaced Asset Server");

    // bare names are expanded with the search extensions: `greeting` -> `greeting.json`
    let greeting = strings.fetch("demo://Texts/greeting").unwrap();
    println!("demo://Texts/greeting -> {greeting:?}");

    let sample = texts
        .fetch_async("demo://sample-text", &CancellationToken::new())
        .await
        .unwrap()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned());
    println!("Texts view, demo://sample-text -> {sample:?}");

    let missing = bytes.fetch("demo://nothing-here").unwrap();
    println!("demo://nothing-here -> {missing:?}");

    match bytes.fetch("Not A Uri") {
        Ok(_) => unreachable!(),
        Err(err) => println!("Not A Uri -> error: {err}"),
    }

    bytes.close().unwrap();
    std::fs::remove_dir_all(&tmp).unwrap();
}
