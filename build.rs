fn main() {
    // Build scripts run on the host, so the ESP-IDF environment is only
    // emitted when cross-compiling for an Xtensa ESP32 target.
    if let Ok(target) = std::env::var("TARGET") {
        if target.contains("xtensa") || target.contains("espidf") {
            embuild::espidf::sysenv::output();
        }
    }
}
