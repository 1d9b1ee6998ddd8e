mod cli;
mod render;

use std::fs::File;
use std::io::{self, Write};

use clap::Parser;
use fat12::volume::data::{Attribute, EntryStatus, FatDirectoryEntry};
use fat12::Volume;
use typed_bytesize::ByteSizeIec;

pub use self::cli::Cli;

fn main() -> fat12::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("image={:?}", cli.image);

    let mut image = File::open(&cli.image)?;
    let volume = Volume::new(&mut image)?;

    println!("{}", render::cluster_map(&volume.cluster_statuses(), cli.width));
    println!(
        "TYPE={}; LABEL={}",
        volume.ebpb().system_id(),
        volume.ebpb().volume_label()
    );

    for entry in volume
        .root_directory()
        .iter()
        .filter(|entry| entry.status() == EntryStatus::InUse)
    {
        println!("{}", listing(entry));
    }

    if let Some(path) = &cli.file {
        let entry = volume.lookup(path, &mut image)?;
        if entry.is_directory() {
            for entry in volume
                .read_directory(&entry, &mut image)?
                .iter()
                .filter(|entry| entry.status() == EntryStatus::InUse)
            {
                println!("{}", listing(entry));
            }
        } else {
            let data = volume.read_file(&entry, &mut image)?;
            log::debug!("{path}: {} bytes", data.len());
            io::stdout().write_all(&data)?;
        }
    }

    Ok(())
}

fn listing(entry: &FatDirectoryEntry) -> String {
    let flags: String = [
        (Attribute::Directory, 'd'),
        (Attribute::ReadOnly, 'r'),
        (Attribute::Hidden, 'h'),
        (Attribute::System, 's'),
        (Attribute::Archive, 'a'),
        (Attribute::VolumeLabel, 'v'),
    ]
    .iter()
    .map(|&(attribute, c)| if entry.attributes.contains(attribute) { c } else { '-' })
    .collect();

    let modified = entry.modify_time().as_secs();
    format!(
        "{flags} {:<12} {:>10} {} {:02}:{:02}:{:02}",
        entry.full_name(),
        ByteSizeIec(u64::from(entry.file_size)).to_string(),
        entry.modify_date(),
        modified / 3600,
        modified / 60 % 60,
        modified % 60
    )
}
