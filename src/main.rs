fn main() {
    if let Err(e) = vision_ar_lib::run() {
        log::error!("{}", e);
        eprintln!("vision-ar: {e}");
        std::process::exit(1);
    }
}
