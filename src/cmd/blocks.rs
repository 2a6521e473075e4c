use std::path::PathBuf;

use nimaloader::nima::{Block, BlockIter, BlockTag, Cursor, NimaHeader, Result, SignaturePolicy};

use crate::cmd::util::emit_json;

#[derive(clap::Args)]
pub struct Args {
	pub path: PathBuf,
	#[arg(long)]
	pub lenient: bool,
	#[arg(long)]
	pub json: bool,
}

/// List top-level blocks without decoding their payloads.
pub fn run(args: Args) -> Result<()> {
	let Args { path, lenient, json } = args;

	let bytes = std::fs::read(&path)?;
	let policy = if lenient { SignaturePolicy::Lenient } else { SignaturePolicy::Strict };
	let header = NimaHeader::parse(&bytes, policy)?;

	let mut cursor = Cursor::new(&bytes);
	cursor.read_exact(NimaHeader::SIZE)?;
	let mut iter = BlockIter::new(cursor);
	let blocks: Vec<BlockJson> = iter.by_ref().map(|block| block_json(&block)).collect();
	let error = iter.take_error().map(|err| err.to_string());

	if json {
		let payload = BlocksJson {
			path: path.display().to_string(),
			data_version: header.version.0,
			blocks,
			error,
		};
		emit_json(&payload);
		return Ok(());
	}

	println!("path: {}", path.display());
	println!("data_version: {}", header.version.0);
	for block in &blocks {
		let children = block.children.map_or_else(String::new, |count| format!(" children={count}"));
		println!("{:>8} tag={:<3} {:<20} len={}{}", block.offset, block.tag, block.kind, block.len, children);
	}
	if let Some(error) = &error {
		println!("error: {error}");
	}

	Ok(())
}

fn block_json(block: &Block<'_>) -> BlockJson {
	let kind = block.kind();
	BlockJson {
		offset: block.offset,
		tag: block.tag,
		kind: kind.map_or("unknown", BlockTag::as_str),
		len: block.payload.len(),
		children: match kind {
			Some(BlockTag::Components | BlockTag::Animations | BlockTag::NestedActorAssets) => count_children(block),
			_ => None,
		},
	}
}

/// Count nested blocks after a container's `u16` count prefix.
fn count_children(block: &Block<'_>) -> Option<usize> {
	let mut cursor = block.cursor();
	cursor.read_u16().ok()?;
	Some(BlockIter::new(cursor).count())
}

#[derive(serde::Serialize)]
struct BlocksJson {
	path: String,
	data_version: u32,
	blocks: Vec<BlockJson>,
	error: Option<String>,
}

#[derive(serde::Serialize)]
struct BlockJson {
	offset: usize,
	tag: u8,
	kind: &'static str,
	len: usize,
	children: Option<usize>,
}
