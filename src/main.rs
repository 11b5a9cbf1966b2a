use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let Some(wav_path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("用法: voice-anim-trigger <file.wav>");
        return ExitCode::from(2);
    };

    match voice_anim_trigger_lib::run(&wav_path) {
        Ok(message) => {
            println!("{message}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("错误: {e}");
            ExitCode::FAILURE
        }
    }
}
