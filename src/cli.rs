use clap::{Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("campoll")
        .version("0.1.0")
        .about("Polls snapshot images from HTTP cameras and assembles them into timelapse videos.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
        )
        .subcommand(
            Command::new("poll")
                .about("Runs the polling daemon: one snapshot loop per configured camera")
                .arg(Arg::new("output").short('o').long("output").value_name("DIR").help("Root directory for saved snapshots (overrides save_dir from the config)").action(ArgAction::Set))
        )
        .subcommand(
            Command::new("timelapse")
                .about("Encodes a directory of still images into a single video file")
                .arg(Arg::new("images").value_name("DIR").required(true).help("Directory containing the input images").action(ArgAction::Set))
                .arg(Arg::new("output").short('o').long("output").value_name("FILE").help("Output video file path (default: timelapse.<video_format>)").action(ArgAction::Set))
                .arg(Arg::new("fps").long("fps").value_name("FPS").help("Frames per second for the output video").value_parser(clap::value_parser!(f64)).action(ArgAction::Set))
                .arg(Arg::new("extension").long("ext").value_name("EXT").help("Image file extension to include, with the dot (default: .jpg)").action(ArgAction::Set))
        )
}
