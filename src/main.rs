fn main() {
    let log_filter = std::env::var_os("RUST_LOG")
        .and_then(|filter| filter.into_string().ok())
        .unwrap_or_else(|| String::from("warn,stream_gate_bot=debug"));

    // The journal stamps every line already, so skip our own timestamps there.
    let running_as_systemd_service = std::env::var_os("JOURNAL_STREAM").is_some();

    let mut builder = match running_as_systemd_service {
        true => pretty_env_logger::formatted_builder(),
        false => pretty_env_logger::formatted_timed_builder(),
    };

    builder.parse_filters(&log_filter);

    if builder.try_init().is_err() {
        log::error!("Tried to init logger twice!");
    }

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build the async runtime!")
        .block_on(stream_gate_bot::entry());
}
