//! 多來源訂單分配

use kitting_core::BlendPolicy;

use crate::draft::SelectedSource;

/// 分配結果
#[derive(Debug, Clone)]
pub struct Blend<'a> {
    /// (來源訂單, 分配數量)，只包含數量大於 0 的訂單
    pub allocations: Vec<(&'a SelectedSource, u32)>,

    /// 來源訂單容量不足而未分配的數量
    pub unallocated: u32,
}

/// 分配計算器
pub struct BlendCalculator;

impl BlendCalculator {
    /// 將自製數量依分配方式拆到各來源訂單
    pub fn split(
        own_quantity: u32,
        sources: &[SelectedSource],
        policy: BlendPolicy,
    ) -> Blend<'_> {
        let mut ordered: Vec<&SelectedSource> = sources.iter().collect();
        if policy == BlendPolicy::Fifo {
            ordered.sort_by(|a, b| {
                a.created_on
                    .cmp(&b.created_on)
                    .then_with(|| a.order_number.cmp(&b.order_number))
            });
        }

        let mut allocations = Vec::new();
        let mut remaining_qty = own_quantity;

        for source in ordered {
            if remaining_qty == 0 {
                break;
            }

            let taken = source.remaining.min(remaining_qty);
            if taken > 0 {
                allocations.push((source, taken));
                remaining_qty -= taken;
            }
        }

        Blend {
            allocations,
            unallocated: remaining_qty,
        }
    }
}
