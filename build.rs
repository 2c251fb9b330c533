fn main() {
    // ESP-IDF link arguments are only needed for the device build; host
    // tests compile without the toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
