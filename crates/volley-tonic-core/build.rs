use std::env;
use std::path::PathBuf;

fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("volley_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();

    // Keep the ingest payload as `Bytes` rather than `Vec<u8>` so large
    // payloads decode without an extra copy.
    config
        .bytes([".volley.IngestRequest.payload"])
        .file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/volley.proto"], &["proto"])
        .unwrap();
}
