use std::{env, path::PathBuf};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_dir = PathBuf::from(env::var("OUT_DIR")?);

    let mut config = prost_build::Config::new();
    config.protoc_executable(protoc_bin_vendored::protoc_bin_path()?);

    let well_known = protoc_bin_vendored::include_path()?;

    tonic_build::configure()
        .file_descriptor_set_path(out_dir.join("roster_descriptor.bin"))
        .compile_protos_with_config(config, &["proto/roster.proto"], &[PathBuf::from("proto"), well_known])?;

    println!("cargo:rerun-if-changed=proto/roster.proto");
    println!("cargo:rerun-if-changed=migrations");
    Ok(())
}
