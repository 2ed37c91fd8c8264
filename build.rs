fn main() {
    println!("cargo:rerun-if-env-changed=SONAR_ROVER_CONFIG");

    // ESP-IDF link arguments are only needed for the firmware binary.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
