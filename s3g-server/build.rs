use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let protoc = protoc_bin_vendored::protoc_bin_path()?;
    // Build scripts run single-threaded.
    unsafe {
        std::env::set_var("PROTOC", protoc);
    }

    let includes = [PathBuf::from("proto"), protoc_bin_vendored::include_path()?];

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .bytes(["."])
        .compile_protos(&["proto/s3file.proto"], &includes)?;

    println!("cargo:rerun-if-changed=proto/s3file.proto");
    Ok(())
}
