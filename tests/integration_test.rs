use thpscope::allocator::alloc_region;
use thpscope::hugetlb::HugetlbAllocator;
use thpscope::memory::{Advice, MemInfo, SmapsEntry};
use thpscope::thp::ThpAllocator;
use thpscope::util::Size::MB;

fn thp_supported() -> bool {
    std::path::Path::new("/sys/kernel/mm/transparent_hugepage/enabled").exists()
}

#[test]
fn advice_shows_up_in_vm_flags() -> anyhow::Result<()> {
    if !thp_supported() {
        return Ok(());
    }
    let mut hugepage = alloc_region(&mut ThpAllocator::new(Advice::Hugepage), MB(4))?;
    let mut nohugepage = alloc_region(&mut ThpAllocator::new(Advice::NoHugepage), MB(4))?;
    hugepage.fill(0xA5);
    nohugepage.fill(0x5A);

    let smaps = std::fs::read_to_string(thpscope::memory::SMAPS_PATH)?;
    let hg = SmapsEntry::find_containing(&smaps, hugepage.ptr() as usize).expect("hugepage VMA");
    let nh = SmapsEntry::find_containing(&smaps, nohugepage.ptr() as usize).expect("nohugepage VMA");
    assert!(hg.has_flag("hg"));
    assert!(!hg.has_flag("nh"));
    assert!(nh.has_flag("nh"));
    // resident after the fill
    assert!(nh.rss.is_some_and(|rss| rss.bytes() >= MB(4).bytes()));
    // never backed by THP
    assert_eq!(nh.anon_huge_pages.map(|s| s.bytes()), Some(0));

    hugepage.release()?;
    nohugepage.release()?;
    Ok(())
}

#[test]
fn hugetlb_follows_meminfo() -> anyhow::Result<()> {
    let Some(page_size) = MemInfo::read()?.hugepage_size else {
        return Ok(());
    };
    let allocator = HugetlbAllocator::from_meminfo()?;
    assert_eq!(
        thpscope::allocator::RegionAllocator::page_size(&allocator),
        page_size
    );
    Ok(())
}
