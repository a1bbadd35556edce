//! Info command

use scenestream_api::{CHUNK_SIZE, ClientConfig, FRAME_FOOTER, FRAME_HEADER, module_info};
use scenestream_core::FIELD_ROLES;

pub fn run() {
    let info = module_info();

    println!("SceneStream Module");
    println!("==================\n");

    println!("  Name:        {}", info.name);
    println!("  Version:     {}", info.version);
    println!("  License:     {}", info.license);
    println!("  Description: {}", info.description);
    println!("  Components:  {}", info.components.join(", "));

    println!();
    println!("Protocol:");
    println!("  Header:      {}", String::from_utf8_lossy(FRAME_HEADER));
    println!("  Footer:      {}", String::from_utf8_lossy(FRAME_FOOTER));
    println!("  Chunk size:  {} bytes", CHUNK_SIZE);

    let config = ClientConfig::default();
    println!("  Default:     {}:{}", config.host, config.port);

    println!();
    println!("Recognized Fields:");
    for (name, role) in FIELD_ROLES {
        println!("  - {} ({:?})", name, role);
    }
}
